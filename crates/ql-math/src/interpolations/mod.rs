//! 1D interpolation trait and implementations (translates
//! `ql/math/interpolation.hpp` and `ql/math/interpolations/`).
//!
//! Both schemes extrapolate by continuing the first or last segment; the
//! callers decide whether a point outside `[x_min, x_max]` is acceptable.

pub mod cubic;

pub use cubic::MonotonicCubicNaturalSpline;

use ql_core::{errors::Result, Real};

/// A 1D interpolation function `f: R → R` defined by a set of known points.
///
/// Corresponds to `QuantLib::Interpolation`.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`.
    fn operator(&self, x: Real) -> Real;

    /// Return the lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Return the upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Binary search: find `i` such that `xs[i] <= x < xs[i+1]`, clamped to the
/// first and last segment.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // First node strictly greater than x, minus one.
    xs.partition_point(|&xi| xi <= x) - 1
}

fn check_nodes(xs: &[Real], ys: &[Real]) -> Result<()> {
    ql_core::ensure!(xs.len() >= 2, "need at least 2 points for interpolation");
    ql_core::ensure!(
        xs.len() == ys.len(),
        "xs ({}) and ys ({}) must have the same length",
        xs.len(),
        ys.len()
    );
    ql_core::ensure!(
        xs.windows(2).all(|w| w[1] > w[0]),
        "interpolation abscissae must be strictly increasing"
    );
    Ok(())
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from sorted `xs` and corresponding `ys`.
    ///
    /// # Errors
    /// Returns an error if the slices have different lengths, fewer than 2
    /// points, or `xs` is not strictly increasing.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    /// Slope of the segment containing `x`.
    pub fn derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i])
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.ys[i] + (x - self.xs[i]) * self.derivative(x)
    }
}
