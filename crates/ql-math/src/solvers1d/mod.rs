//! 1D root-finding solvers (translates `ql/math/solver1d.hpp` and
//! `ql/math/solvers1d/brent.hpp`).
//!
//! The solver is consumed through the bracket-then-refine contract
//! `solve(f, accuracy, guess, step) -> root`: starting from `guess`, the
//! bracket is grown geometrically (factor 1.6) until `f` changes sign, then
//! Brent's method refines the root. Both phases share one evaluation budget.

use ql_core::{
    errors::{Error, Result},
    Real, QL_EPSILON,
};

use crate::comparison::close;

const MAX_EVALUATIONS: usize = 100;
const GROWTH_FACTOR: Real = 1.6;

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method for finding a root of `f(x)`.
///
/// Combines bisection, secant, and inverse quadratic interpolation.
///
/// Corresponds to `QuantLib::Brent`.
#[derive(Debug, Clone, Copy)]
pub struct Brent {
    max_evaluations: usize,
    lower_bound: Option<Real>,
    upper_bound: Option<Real>,
}

impl Default for Brent {
    fn default() -> Self {
        Self::new()
    }
}

/// Working state shared by the bracketing and refinement phases.
#[derive(Debug, Default)]
struct State {
    root: Real,
    x_min: Real,
    x_max: Real,
    fx_min: Real,
    fx_max: Real,
    evaluations: usize,
}

impl Brent {
    /// A solver with the default budget of 100 function evaluations.
    pub fn new() -> Self {
        Self {
            max_evaluations: MAX_EVALUATIONS,
            lower_bound: None,
            upper_bound: None,
        }
    }

    /// Change the evaluation budget.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Never evaluate `f` below `lower_bound` while searching for a bracket.
    pub fn with_lower_bound(mut self, lower_bound: Real) -> Self {
        self.lower_bound = Some(lower_bound);
        self
    }

    /// Never evaluate `f` above `upper_bound` while searching for a bracket.
    pub fn with_upper_bound(mut self, upper_bound: Real) -> Self {
        self.upper_bound = Some(upper_bound);
        self
    }

    fn enforce_bounds(&self, x: Real) -> Real {
        let x = match self.lower_bound {
            Some(lo) if x < lo => lo,
            _ => x,
        };
        match self.upper_bound {
            Some(hi) if x > hi => hi,
            _ => x,
        }
    }

    /// Find a root of `f` near `guess`, growing a bracket from `guess ± step`.
    ///
    /// # Errors
    /// `NotBracketed` if no sign change is found within the evaluation
    /// budget, `MaxEvaluationsExceeded` if the refinement does not converge,
    /// `Precondition` for a non-positive accuracy.
    pub fn solve<F>(&self, mut f: F, accuracy: Real, guess: Real, step: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        self.try_solve(|x| Ok(f(x)), accuracy, guess, step)
    }

    /// Like [`solve`](Self::solve), for a function that can itself fail.
    pub fn try_solve<F>(&self, mut f: F, accuracy: Real, guess: Real, step: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        ql_core::ensure!(accuracy > 0.0, "accuracy ({accuracy}) must be positive");
        let accuracy = accuracy.max(QL_EPSILON);

        let mut flipflop = -1;
        let mut s = State {
            root: guess,
            ..State::default()
        };
        s.fx_max = f(s.root)?;

        if close(s.fx_max, 0.0) {
            return Ok(s.root);
        } else if s.fx_max > 0.0 {
            s.x_min = self.enforce_bounds(s.root - step);
            s.fx_min = f(s.x_min)?;
            s.x_max = s.root;
        } else {
            s.x_min = s.root;
            s.fx_min = s.fx_max;
            s.x_max = self.enforce_bounds(s.root + step);
            s.fx_max = f(s.x_max)?;
        }

        s.evaluations = 2;
        while s.evaluations <= self.max_evaluations {
            if s.fx_min * s.fx_max <= 0.0 {
                if close(s.fx_min, 0.0) {
                    return Ok(s.x_min);
                }
                if close(s.fx_max, 0.0) {
                    return Ok(s.x_max);
                }
                s.root = 0.5 * (s.x_max + s.x_min);
                return self.refine(&mut f, accuracy, s);
            }
            if s.fx_min.abs() < s.fx_max.abs() {
                s.x_min = self.enforce_bounds(s.x_min + GROWTH_FACTOR * (s.x_min - s.x_max));
                s.fx_min = f(s.x_min)?;
            } else if s.fx_min.abs() > s.fx_max.abs() {
                s.x_max = self.enforce_bounds(s.x_max + GROWTH_FACTOR * (s.x_max - s.x_min));
                s.fx_max = f(s.x_max)?;
            } else if flipflop == -1 {
                s.x_min = self.enforce_bounds(s.x_min + GROWTH_FACTOR * (s.x_min - s.x_max));
                s.fx_min = f(s.x_min)?;
                s.evaluations += 1;
                flipflop = 1;
            } else {
                s.x_max = self.enforce_bounds(s.x_max + GROWTH_FACTOR * (s.x_max - s.x_min));
                s.fx_max = f(s.x_max)?;
                flipflop = -1;
            }
            s.evaluations += 1;
        }

        Err(Error::NotBracketed {
            evaluations: self.max_evaluations,
            x_min: s.x_min,
            x_max: s.x_max,
            f_min: s.fx_min,
            f_max: s.fx_max,
        })
    }

    /// Find a root of `f` inside the bracket `[x_min, x_max]`, starting from
    /// `guess`.
    pub fn solve_bracketed<F>(
        &self,
        mut f: F,
        accuracy: Real,
        guess: Real,
        x_min: Real,
        x_max: Real,
    ) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        ql_core::ensure!(accuracy > 0.0, "accuracy ({accuracy}) must be positive");
        ql_core::ensure!(
            x_min < x_max,
            "invalid range: x_min ({x_min}) >= x_max ({x_max})"
        );
        let accuracy = accuracy.max(QL_EPSILON);

        let mut s = State {
            x_min,
            x_max,
            ..State::default()
        };
        s.fx_min = f(x_min);
        if close(s.fx_min, 0.0) {
            return Ok(x_min);
        }
        s.fx_max = f(x_max);
        if close(s.fx_max, 0.0) {
            return Ok(x_max);
        }
        s.evaluations = 2;

        if s.fx_min * s.fx_max >= 0.0 {
            return Err(Error::NotBracketed {
                evaluations: s.evaluations,
                x_min,
                x_max,
                f_min: s.fx_min,
                f_max: s.fx_max,
            });
        }
        ql_core::ensure!(
            guess > x_min && guess < x_max,
            "guess ({guess}) outside the bracket [{x_min}, {x_max}]"
        );
        s.root = guess;
        self.refine(&mut |x| Ok(f(x)), accuracy, s)
    }

    fn refine<F>(&self, f: &mut F, accuracy: Real, mut s: State) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        let mut d: Real = 0.0;
        let mut e: Real = 0.0;

        s.root = s.x_max;
        let mut froot = s.fx_max;
        while s.evaluations <= self.max_evaluations {
            if (froot > 0.0 && s.fx_max > 0.0) || (froot < 0.0 && s.fx_max < 0.0) {
                // Rename x_min, root, x_max and adjust the bounding interval.
                s.x_max = s.x_min;
                s.fx_max = s.fx_min;
                d = s.root - s.x_min;
                e = d;
            }
            if s.fx_max.abs() < froot.abs() {
                s.x_min = s.root;
                s.root = s.x_max;
                s.x_max = s.x_min;
                s.fx_min = froot;
                froot = s.fx_max;
                s.fx_max = s.fx_min;
            }
            let x_acc1 = 2.0 * QL_EPSILON * s.root.abs() + 0.5 * accuracy;
            let x_mid = 0.5 * (s.x_max - s.root);
            if x_mid.abs() <= x_acc1 || close(froot, 0.0) {
                return Ok(s.root);
            }
            if e.abs() >= x_acc1 && s.fx_min.abs() > froot.abs() {
                let sr = froot / s.fx_min;
                let (mut p, mut q) = if close(s.x_min, s.x_max) {
                    (2.0 * x_mid * sr, 1.0 - sr)
                } else {
                    let q = s.fx_min / s.fx_max;
                    let r = froot / s.fx_max;
                    (
                        sr * (2.0 * x_mid * q * (q - r) - (s.root - s.x_min) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (sr - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                let min1 = 3.0 * x_mid * q - (x_acc1 * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = x_mid;
                    e = d;
                }
            } else {
                d = x_mid;
                e = d;
            }
            s.x_min = s.root;
            s.fx_min = froot;
            s.root += if d.abs() > x_acc1 {
                d
            } else {
                x_acc1.copysign(x_mid)
            };
            froot = f(s.root)?;
            s.evaluations += 1;
        }

        Err(Error::MaxEvaluationsExceeded {
            routine: "Brent",
            max: self.max_evaluations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn brent_sqrt2_from_guess() {
        let root = Brent::new().solve(|x| x * x - 2.0, 1e-12, 1.0, 0.1).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn brent_sqrt2_bracketed() {
        let root = Brent::new()
            .solve_bracketed(|x| x * x - 2.0, 1e-12, 1.0, 0.0, 2.0)
            .unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn bracket_grows_towards_far_root() {
        let root = Brent::new().solve(|x| x - 250.0, 1e-10, 0.0, 0.5).unwrap();
        assert_abs_diff_eq!(root, 250.0, epsilon = 1e-8);
    }

    #[test]
    fn missing_sign_change_is_not_bracketed() {
        let err = Brent::new()
            .solve(|x| x * x + 1.0, 1e-10, 0.0, 0.1)
            .unwrap_err();
        assert!(matches!(err, Error::NotBracketed { .. }), "{err}");
    }

    #[test]
    fn bracketed_requires_opposite_signs() {
        let err = Brent::new()
            .solve_bracketed(|x| x, 1e-10, 1.5, 1.0, 2.0)
            .unwrap_err();
        assert!(matches!(err, Error::NotBracketed { .. }));
    }

    #[test]
    fn tiny_budget_exhausts() {
        let err = Brent::new()
            .with_max_evaluations(4)
            .solve(|x| x.powi(3) - 7.0, 1e-14, 0.0, 0.01)
            .unwrap_err();
        assert!(err.is_numerical());
    }

    #[test]
    fn lower_bound_is_respected() {
        let solver = Brent::new().with_lower_bound(0.0);
        let root = solver
            .solve(
                |x| {
                    assert!(x >= 0.0, "evaluated below the lower bound: {x}");
                    x.ln()
                },
                1e-12,
                0.5,
                0.4,
            )
            .unwrap();
        assert_abs_diff_eq!(root, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn fallible_function_propagates() {
        let err = Brent::new()
            .try_solve(|_| Err(Error::Runtime("boom".into())), 1e-8, 0.0, 1.0)
            .unwrap_err();
        assert_eq!(err, Error::Runtime("boom".into()));
    }

    #[test]
    fn non_positive_accuracy_rejected() {
        assert!(Brent::new().solve(|x| x, 0.0, 1.0, 0.1).is_err());
    }
}
