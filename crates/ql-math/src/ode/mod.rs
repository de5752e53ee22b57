//! ODE solvers (translates `ql/math/ode/`).
//!
//! Provides an adaptive Runge-Kutta 4th/5th order solver (Dormand-Prince
//! stages with embedded error estimate) for systems `dy/dx = f(x, y)`.
//! The integration direction follows the sign of `x2 - x1`, so the same
//! solver rolls a state forwards or backwards in time.

use ql_core::{
    errors::{Error, Result},
    Real,
};

const SAFETY: Real = 0.9;
const P_GROW: Real = -0.2;
const P_SHRINK: Real = -0.25;
const ERR_CON: Real = 1.89e-4;
const TINY: Real = 1e-30;
const MAX_STEPS: usize = 10_000;

/// Adaptive Runge-Kutta 4(5) ODE solver.
///
/// Each step is accepted once the scaled embedded error is below `eps`;
/// otherwise the step is shrunk and retried. The first trial step has size
/// `h1`; a proposed step at or below `h_min` is an error.
///
/// Corresponds to `QuantLib::AdaptiveRungeKutta`.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveRungeKutta {
    eps: Real,
    h1: Real,
    h_min: Real,
}

impl AdaptiveRungeKutta {
    /// Create a new solver with tolerance `eps`, initial step `h1` and
    /// minimal step `h_min`.
    pub fn new(eps: Real, h1: Real, h_min: Real) -> Self {
        Self { eps, h1, h_min }
    }

    /// Integrate the system from `x1` to `x2`, returning `y(x2)`.
    ///
    /// # Errors
    /// `MaxEvaluationsExceeded` after too many steps, `NotConverged` when the
    /// step size underflows.
    pub fn integrate<F>(&self, mut f: F, y0: &[Real], x1: Real, x2: Real) -> Result<Vec<Real>>
    where
        F: FnMut(Real, &[Real]) -> Vec<Real>,
    {
        ql_core::ensure!(self.eps > 0.0, "tolerance ({}) must be positive", self.eps);
        if x1 == x2 {
            return Ok(y0.to_vec());
        }

        let mut y = y0.to_vec();
        let mut x = x1;
        let mut h = self.h1.abs().copysign(x2 - x1);

        for _ in 0..MAX_STEPS {
            let dydx = f(x, &y);
            let y_scale: Vec<Real> = y
                .iter()
                .zip(&dydx)
                .map(|(yi, di)| yi.abs() + (di * h).abs() + TINY)
                .collect();

            if (x + h - x2) * (x + h - x1) > 0.0 {
                h = x2 - x;
            }
            let h_next = self.quality_step(&mut f, &mut y, &dydx, &mut x, h, &y_scale)?;

            if (x - x2) * (x2 - x1) >= 0.0 {
                return Ok(y);
            }
            if h_next.abs() <= self.h_min {
                return Err(Error::NotConverged {
                    routine: "AdaptiveRungeKutta",
                    iterations: MAX_STEPS,
                    tolerance: self.eps,
                    residual: h_next.abs(),
                });
            }
            h = h_next;
        }

        Err(Error::MaxEvaluationsExceeded {
            routine: "AdaptiveRungeKutta",
            max: MAX_STEPS,
        })
    }

    /// Integrate a scalar equation `dy/dx = f(x, y)` from `x1` to `x2`.
    pub fn integrate_scalar<F>(&self, mut f: F, y0: Real, x1: Real, x2: Real) -> Result<Real>
    where
        F: FnMut(Real, Real) -> Real,
    {
        let y = self.integrate(|x, y: &[Real]| vec![f(x, y[0])], &[y0], x1, x2)?;
        Ok(y[0])
    }

    /// Take one accepted step starting with trial size `h_try`; advances `x`
    /// and `y` in place and returns the proposed next step.
    fn quality_step<F>(
        &self,
        f: &mut F,
        y: &mut Vec<Real>,
        dydx: &[Real],
        x: &mut Real,
        h_try: Real,
        y_scale: &[Real],
    ) -> Result<Real>
    where
        F: FnMut(Real, &[Real]) -> Vec<Real>,
    {
        let mut h = h_try;
        loop {
            let (y_temp, y_err) = dormand_prince_step(f, *x, y, dydx, h);
            let err_max = y_err
                .iter()
                .zip(y_scale)
                .fold(0.0_f64, |m, (e, s)| m.max((e / s).abs()))
                / self.eps;

            if err_max <= 1.0 {
                *x += h;
                *y = y_temp;
                return Ok(if err_max > ERR_CON {
                    SAFETY * h * err_max.powf(P_GROW)
                } else {
                    5.0 * h
                });
            }

            let h_temp = SAFETY * h * err_max.powf(P_SHRINK);
            h = if h >= 0.0 {
                h_temp.max(0.1 * h)
            } else {
                h_temp.min(0.1 * h)
            };
            if *x + h == *x {
                return Err(Error::NotConverged {
                    routine: "AdaptiveRungeKutta",
                    iterations: 0,
                    tolerance: self.eps,
                    residual: err_max * self.eps,
                });
            }
        }
    }
}

impl Default for AdaptiveRungeKutta {
    fn default() -> Self {
        Self::new(1e-6, 1e-4, 0.0)
    }
}

/// Single Dormand-Prince step. Returns `(y_new, error_estimate)`.
fn dormand_prince_step<F>(
    f: &mut F,
    x: Real,
    y: &[Real],
    k1: &[Real],
    h: Real,
) -> (Vec<Real>, Vec<Real>)
where
    F: FnMut(Real, &[Real]) -> Vec<Real>,
{
    let n = y.len();
    let stage = |w: &[(&[Real], Real)]| -> Vec<Real> {
        (0..n)
            .map(|i| y[i] + h * w.iter().map(|(k, c)| c * k[i]).sum::<Real>())
            .collect()
    };

    let k2 = f(x + h / 5.0, &stage(&[(k1, 1.0 / 5.0)]));
    let k3 = f(
        x + 3.0 / 10.0 * h,
        &stage(&[(k1, 3.0 / 40.0), (k2.as_slice(), 9.0 / 40.0)]),
    );
    let k4 = f(
        x + 4.0 / 5.0 * h,
        &stage(&[(k1, 44.0 / 45.0), (k2.as_slice(), -56.0 / 15.0), (k3.as_slice(), 32.0 / 9.0)]),
    );
    let k5 = f(
        x + 8.0 / 9.0 * h,
        &stage(&[
            (k1, 19372.0 / 6561.0),
            (k2.as_slice(), -25360.0 / 2187.0),
            (k3.as_slice(), 64448.0 / 6561.0),
            (k4.as_slice(), -212.0 / 729.0),
        ]),
    );
    let k6 = f(
        x + h,
        &stage(&[
            (k1, 9017.0 / 3168.0),
            (k2.as_slice(), -355.0 / 33.0),
            (k3.as_slice(), 46732.0 / 5247.0),
            (k4.as_slice(), 49.0 / 176.0),
            (k5.as_slice(), -5103.0 / 18656.0),
        ]),
    );

    let y_new = stage(&[
        (k1, 35.0 / 384.0),
        (k3.as_slice(), 500.0 / 1113.0),
        (k4.as_slice(), 125.0 / 192.0),
        (k5.as_slice(), -2187.0 / 6784.0),
        (k6.as_slice(), 11.0 / 84.0),
    ]);
    let k7 = f(x + h, &y_new);

    let err = (0..n)
        .map(|i| {
            h * (71.0 / 57600.0 * k1[i] - 71.0 / 16695.0 * k3[i] + 71.0 / 1920.0 * k4[i]
                - 17253.0 / 339200.0 * k5[i]
                + 22.0 / 525.0 * k6[i]
                - 1.0 / 40.0 * k7[i])
        })
        .collect();

    (y_new, err)
}
