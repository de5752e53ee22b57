//! Crank-Nicolson (translates `cranknicolsonscheme.hpp`).

use super::{explicit_euler, implicit_euler, require_step, FdmEvolver};
use crate::finite_differences::{
    boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite,
};
use ql_core::{errors::Result, Real, Size, Time};

/// An explicit Euler step weighted `1 - θ` followed by an implicit Euler
/// step weighted `θ`.
///
/// Corresponds to `QuantLib::CrankNicolsonScheme`.
#[derive(Debug)]
pub struct CrankNicolsonScheme<'a> {
    theta: Real,
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    rel_tol: Real,
    dt: Option<Time>,
    iterations: Size,
}

impl<'a> CrankNicolsonScheme<'a> {
    /// Scheme with implicitness `theta`.
    pub fn new(
        theta: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            theta,
            map,
            bc_set,
            rel_tol: implicit_euler::DEFAULT_REL_TOL,
            dt: None,
            iterations: 0,
        }
    }

    /// BiCGStab iterations spent by the implicit half so far.
    pub fn number_of_iterations(&self) -> Size {
        self.iterations
    }
}

impl FdmEvolver for CrankNicolsonScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        let dt = require_step(self.dt)?;
        if self.theta != 1.0 {
            explicit_euler::step(self.map, self.bc_set, a, t, dt, 1.0 - self.theta)?;
        }
        if self.theta != 0.0 {
            self.iterations +=
                implicit_euler::step(self.map, self.bc_set, a, t, dt, self.theta, self.rel_tol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn prices_the_european_put() {
        let mut problem = put_problem(200);
        let bc = FdmBoundaryConditionSet::new();
        let mut a = problem.payoff.clone();
        let mut scheme = CrankNicolsonScheme::new(0.5, &mut problem.op, &bc);
        roll(&mut scheme, &mut a, MATURITY, 100);
        let price = value_at_spot(&problem.mesher, &a);
        assert_abs_diff_eq!(price, ATM_PUT, epsilon = 0.02);
    }

    #[test]
    fn unit_theta_is_implicit_euler() {
        let bc = FdmBoundaryConditionSet::new();

        let mut p1 = put_problem(50);
        let mut a1 = p1.payoff.clone();
        roll(&mut CrankNicolsonScheme::new(1.0, &mut p1.op, &bc), &mut a1, MATURITY, 10);

        let mut p2 = put_problem(50);
        let mut a2 = p2.payoff.clone();
        roll(&mut implicit_euler::ImplicitEulerScheme::new(&mut p2.op, &bc), &mut a2, MATURITY, 10);

        assert_eq!(a1, a2);
    }
}
