//! Monotonic natural cubic spline (translates the `Spline` /
//! `SecondDerivative` / monotonic flavour of
//! `ql/math/interpolations/cubicinterpolation.hpp`).
//!
//! Node slopes come from the global natural-spline tridiagonal system and
//! are then passed through the Hyman filter, so the interpolant never
//! introduces extrema the data does not have. The value grid of a rollback
//! is interpolated with this spline to read off price, delta and gamma.

use ql_core::{
    errors::{Error, Result},
    Real,
};

use super::{check_nodes, locate, Interpolation1D};

/// Thomas sweep for the small, strictly diagonally dominant slope system.
fn solve_tridiagonal(
    lower: &[Real],
    diag: &[Real],
    upper: &[Real],
    rhs: &[Real],
) -> Result<Vec<Real>> {
    let n = diag.len();
    let mut tmp = vec![0.0; n];
    let mut result = vec![0.0; n];

    let mut bet = diag[0];
    if bet == 0.0 {
        return Err(Error::SingularPivot { row: 0 });
    }
    result[0] = rhs[0] / bet;
    for j in 1..n {
        tmp[j] = upper[j - 1] / bet;
        bet = diag[j] - lower[j - 1] * tmp[j];
        if bet == 0.0 {
            return Err(Error::SingularPivot { row: j });
        }
        result[j] = (rhs[j] - lower[j - 1] * result[j - 1]) / bet;
    }
    for j in (0..n - 1).rev() {
        result[j] -= tmp[j + 1] * result[j + 1];
    }
    Ok(result)
}

/// Clip `t` to `bound` in magnitude, zeroing it unless it agrees in sign
/// with `reference`.
fn clip(t: Real, reference: Real, bound: Real) -> Real {
    if t * reference > 0.0 {
        t.signum() * t.abs().min(bound)
    } else {
        0.0
    }
}

/// Hyman monotonicity filter on the node slopes `ts` given secants `s` and
/// spacings `dx`.
fn hyman_filter(ts: &mut [Real], s: &[Real], dx: &[Real]) {
    let n = ts.len();
    ts[0] = clip(ts[0], s[0], (3.0 * s[0]).abs());
    ts[n - 1] = clip(ts[n - 1], s[n - 2], (3.0 * s[n - 2]).abs());

    for i in 1..n - 1 {
        let pm = (s[i - 1] * dx[i] + s[i] * dx[i - 1]) / (dx[i - 1] + dx[i]);
        let mut m = 3.0 * s[i - 1].abs().min(s[i].abs()).min(pm.abs());

        if i > 1 && (s[i - 1] - s[i - 2]) * (s[i] - s[i - 1]) > 0.0 {
            let pd = (s[i - 1] * (2.0 * dx[i - 1] + dx[i - 2]) - s[i - 2] * dx[i - 1])
                / (dx[i - 2] + dx[i - 1]);
            if pm * pd > 0.0 && pm * (s[i - 1] - s[i - 2]) > 0.0 {
                m = m.max(1.5 * pm.abs().min(pd.abs()));
            }
        }
        if i + 2 < n && (s[i] - s[i - 1]) * (s[i + 1] - s[i]) > 0.0 {
            let pu = (s[i] * (2.0 * dx[i] + dx[i + 1]) - s[i + 1] * dx[i]) / (dx[i] + dx[i + 1]);
            if pm * pu > 0.0 && -pm * (s[i] - s[i - 1]) > 0.0 {
                m = m.max(1.5 * pm.abs().min(pu.abs()));
            }
        }
        ts[i] = clip(ts[i], pm, m);
    }
}

// ── MonotonicCubicNaturalSpline ───────────────────────────────────────────────

/// Natural cubic spline (zero second derivative at both ends) with Hyman
/// monotonicity filtering.
///
/// On `[x_i, x_{i+1}]` the interpolant is
/// `y_i + dx*(a_i + dx*(b_i + dx*c_i))` with `dx = x - x_i`.
///
/// Corresponds to `QuantLib::MonotonicCubicNaturalSpline`.
#[derive(Debug, Clone)]
pub struct MonotonicCubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
}

impl MonotonicCubicNaturalSpline {
    /// Build the spline through `(xs[i], ys[i])`.
    ///
    /// # Errors
    /// Fewer than two nodes, mismatched lengths, or non-increasing `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys)?;
        let n = xs.len();

        let dx: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let s: Vec<Real> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / dx[i]).collect();

        let mut lower = vec![0.0; n - 1];
        let mut diag = vec![0.0; n];
        let mut upper = vec![0.0; n - 1];
        let mut rhs = vec![0.0; n];

        for i in 1..n - 1 {
            lower[i - 1] = dx[i];
            diag[i] = 2.0 * (dx[i] + dx[i - 1]);
            upper[i] = dx[i - 1];
            rhs[i] = 3.0 * (dx[i] * s[i - 1] + dx[i - 1] * s[i]);
        }
        // Vanishing second derivative at both ends.
        diag[0] = 2.0;
        upper[0] = 1.0;
        rhs[0] = 3.0 * s[0];
        lower[n - 2] = 1.0;
        diag[n - 1] = 2.0;
        rhs[n - 1] = 3.0 * s[n - 2];

        let mut ts = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;
        hyman_filter(&mut ts, &s, &dx);

        let mut a = Vec::with_capacity(n - 1);
        let mut b = Vec::with_capacity(n - 1);
        let mut c = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            a.push(ts[i]);
            b.push((3.0 * s[i] - ts[i + 1] - 2.0 * ts[i]) / dx[i]);
            c.push((ts[i + 1] + ts[i] - 2.0 * s[i]) / (dx[i] * dx[i]));
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            a,
            b,
            c,
        })
    }

    /// First derivative at `x`.
    pub fn derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.a[i] + (2.0 * self.b[i] + 3.0 * self.c[i] * dx) * dx
    }

    /// Second derivative at `x`.
    pub fn second_derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        2.0 * self.b[i] + 6.0 * self.c[i] * dx
    }
}

impl Interpolation1D for MonotonicCubicNaturalSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }
}
