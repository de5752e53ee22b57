//! Explicit Euler (translates `expliciteulerscheme.hpp`).

use super::{require_step, start_step, FdmEvolver};
use crate::finite_differences::{
    axpy, boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite,
};
use ql_core::{errors::Result, Real, Time};

/// `a ← a + θ·dt·L a`.
///
/// Only conditionally stable: the step has to resolve the fastest mode of
/// the operator, roughly `dt < h²/σ²`.
///
/// Corresponds to `QuantLib::ExplicitEulerScheme`.
#[derive(Debug)]
pub struct ExplicitEulerScheme<'a> {
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    dt: Option<Time>,
}

impl<'a> ExplicitEulerScheme<'a> {
    /// Scheme over `map` with boundary conditions `bc_set`.
    pub fn new(map: &'a mut dyn FdmLinearOpComposite, bc_set: &'a FdmBoundaryConditionSet) -> Self {
        Self {
            map,
            bc_set,
            dt: None,
        }
    }

    /// One step weighted by `theta`.
    pub fn step_with_theta(&mut self, a: &mut [Real], t: Time, theta: Real) -> Result<()> {
        let dt = require_step(self.dt)?;
        step(self.map, self.bc_set, a, t, dt, theta)
    }
}

impl FdmEvolver for ExplicitEulerScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        self.step_with_theta(a, t, 1.0)
    }
}

pub(crate) fn step(
    map: &mut dyn FdmLinearOpComposite,
    bc_set: &FdmBoundaryConditionSet,
    a: &mut [Real],
    t: Time,
    dt: Time,
    theta: Real,
) -> Result<()> {
    start_step(map, bc_set, t, dt)?;
    let la = map.apply(a);
    axpy(a, theta * dt, &la);
    bc_set.apply_after_applying(a);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn small_steps_price_the_european_put() {
        let mut problem = put_problem(100);
        let bc = FdmBoundaryConditionSet::new();
        let mut a = problem.payoff.clone();
        let mut scheme = ExplicitEulerScheme::new(&mut problem.op, &bc);
        roll(&mut scheme, &mut a, MATURITY, 1000);
        let price = value_at_spot(&problem.mesher, &a);
        assert_abs_diff_eq!(price, ATM_PUT, epsilon = 0.03);
    }

    #[test]
    fn step_requires_a_time_step() {
        let mut problem = put_problem(20);
        let bc = FdmBoundaryConditionSet::new();
        let mut a = problem.payoff.clone();
        let mut scheme = ExplicitEulerScheme::new(&mut problem.op, &bc);
        assert!(scheme.step(&mut a, 0.5).is_err());
        scheme.set_step(0.6);
        assert!(scheme.step(&mut a, 0.5).is_err());
    }
}
