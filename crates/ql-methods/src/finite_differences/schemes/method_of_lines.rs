//! Method of lines (translates `methodoflinesscheme.hpp`).

use super::{require_step, FdmEvolver};
use crate::finite_differences::{
    boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite,
};
use ql_core::{errors::Result, Real, Time};
use ql_math::AdaptiveRungeKutta;

/// Offset of the second time handed to `set_time` while integrating.
const OPERATOR_TIME_OFFSET: Time = 1e-4;

/// Treats the semi-discretised PDE as the ODE system `du/dt = -L(t) u` and
/// integrates it backwards over each step with adaptive Runge-Kutta 4(5).
///
/// The operator is re-timed at every stage evaluation. Being explicit, the
/// integrator takes as many sub-steps as the stiffest mode of the grid
/// requires.
///
/// Corresponds to `QuantLib::MethodOfLinesScheme`.
#[derive(Debug)]
pub struct MethodOfLinesScheme<'a> {
    eps: Real,
    rel_init_step: Real,
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    dt: Option<Time>,
}

impl<'a> MethodOfLinesScheme<'a> {
    /// Scheme with ODE tolerance `eps` and first trial step
    /// `rel_init_step·dt`.
    pub fn new(
        eps: Real,
        rel_init_step: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            eps,
            rel_init_step,
            map,
            bc_set,
            dt: None,
        }
    }
}

impl FdmEvolver for MethodOfLinesScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        let dt = require_step(self.dt)?;
        ql_core::ensure!(
            t - dt > -1e-8,
            "a step towards negative time was given (t = {t}, dt = {dt})"
        );

        let map = &mut *self.map;
        let derivative = |tau: Time, u: &[Real]| -> Vec<Real> {
            map.set_time(tau, tau + OPERATOR_TIME_OFFSET);
            map.apply(u).into_iter().map(|v| -v).collect()
        };

        let rk = AdaptiveRungeKutta::new(self.eps, self.rel_init_step * dt, 0.0);
        let mut y = rk.integrate(derivative, a, t, (t - dt).max(0.0))?;
        self.bc_set.apply_after_solving(&mut y);
        a.copy_from_slice(&y);
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
        let mut problem = put_problem(100);
        let bc = FdmBoundaryConditionSet::new();
        let mut a = problem.payoff.clone();
        let mut scheme = MethodOfLinesScheme::new(1e-3, 0.1, &mut problem.op, &bc);
        roll(&mut scheme, &mut a, MATURITY, 10);
        let price = value_at_spot(&problem.mesher, &a);
        assert_abs_diff_eq!(price, ATM_PUT, epsilon = 0.03);
    }

    #[test]
    fn decays_the_heat_mode() {
        let mut op = HeatOp2d::new(15);
        let mut a = op.mode();
        let bc = FdmBoundaryConditionSet::new();
        roll(&mut MethodOfLinesScheme::new(1e-6, 0.1, &mut op, &bc), &mut a, HEAT_TIME, 5);
        assert_abs_diff_eq!(op.centre(&a), HeatOp2d::expected_centre(), epsilon = 5e-3);
    }
}
