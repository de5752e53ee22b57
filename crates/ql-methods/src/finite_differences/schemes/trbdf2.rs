//! TR-BDF2 (translates `trbdf2scheme.hpp`).

use super::{craig_sneyd, implicit_euler::solve_full, require_step, FdmEvolver};
use crate::finite_differences::{
    boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite,
};
use ql_core::{errors::Result, Real, Size, Time};

/// A trapezoidal stage over `α·dt` followed by a BDF2 stage over the rest
/// of the step:
///
/// ```text
/// f* = trapezoidal(a, α·dt)
/// f  = (f*/α - (1-α)²/α · a) / (2 - α)
/// (I - β·L) a_new = f,      β = (1-α)/(2-α)·dt
/// ```
///
/// The trapezoidal stage is a Craig-Sneyd step with θ = μ = 1/2. The BDF2
/// solve is tridiagonal in one dimension and preconditioned BiCGStab
/// otherwise. α = 2 - √2 makes the scheme L-stable.
///
/// Corresponds to `QuantLib::TrBDF2Scheme<CraigSneydScheme>`.
#[derive(Debug)]
pub struct TrBDF2Scheme<'a> {
    alpha: Real,
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    rel_tol: Real,
    dt: Option<Time>,
    iterations: Size,
}

impl<'a> TrBDF2Scheme<'a> {
    /// Scheme with intermediate fraction `alpha` and Krylov tolerance
    /// `rel_tol`.
    pub fn new(
        alpha: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a FdmBoundaryConditionSet,
        rel_tol: Real,
    ) -> Self {
        Self {
            alpha,
            map,
            bc_set,
            rel_tol,
            dt: None,
            iterations: 0,
        }
    }

    /// BiCGStab iterations spent so far.
    pub fn number_of_iterations(&self) -> Size {
        self.iterations
    }
}

impl FdmEvolver for TrBDF2Scheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        let dt = require_step(self.dt)?;
        ql_core::ensure!(
            t - dt > -1e-8,
            "a step towards negative time was given (t = {t}, dt = {dt})"
        );
        let alpha = self.alpha;
        let beta = (1.0 - alpha) / (2.0 - alpha) * dt;

        let mut f_star = a.to_vec();
        craig_sneyd::step(self.map, self.bc_set, &mut f_star, t, alpha * dt, 0.5, 0.5)?;

        self.bc_set.set_time((t - dt).max(0.0));
        self.bc_set.apply_before_solving(a);

        let w = (1.0 - alpha) * (1.0 - alpha) / alpha;
        let f: Vec<Real> = f_star
            .iter()
            .zip(a.iter())
            .map(|(fs, fn_)| (fs / alpha - w * fn_) / (2.0 - alpha))
            .collect();

        let (x, iterations) = solve_full(self.map, &f, beta, self.rel_tol)?;
        self.iterations += iterations;
        a.copy_from_slice(&x);
        self.bc_set.apply_after_solving(a);
        Ok(())
    }
}
