//! Scheme dispatch and damping (translates `fdmbackwardsolver.hpp`).

use super::FiniteDifferenceModel;
use crate::finite_differences::{
    boundary_conditions::FdmBoundaryConditionSet,
    operators::FdmLinearOpComposite,
    schemes::{
        CraigSneydScheme, CrankNicolsonScheme, DouglasScheme, ExplicitEulerScheme, FdmEvolver,
        FdmSchemeDesc, FdmSchemeType, HundsdorferScheme, ImplicitEulerScheme,
        MethodOfLinesScheme, ModifiedCraigSneydScheme, TrBDF2Scheme,
    },
    step_conditions::FdmStepConditionComposite,
};
use ql_core::{errors::Result, Real, Size, Time};
use tracing::debug;

/// Rolls a solution back with the scheme named by an [`FdmSchemeDesc`],
/// optionally preceded by implicit Euler damping steps that smooth the
/// payoff kink.
///
/// Corresponds to `QuantLib::FdmBackwardSolver`.
#[derive(Debug)]
pub struct FdmBackwardSolver<'a> {
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    condition: &'a mut FdmStepConditionComposite,
    scheme_desc: FdmSchemeDesc,
}

impl<'a> FdmBackwardSolver<'a> {
    /// Solver over `map`; `condition` is applied after every step and its
    /// stopping times are landed on.
    pub fn new(
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a FdmBoundaryConditionSet,
        condition: &'a mut FdmStepConditionComposite,
        scheme_desc: FdmSchemeDesc,
    ) -> Self {
        Self {
            map,
            bc_set,
            condition,
            scheme_desc,
        }
    }

    /// Roll `a` from `from` back to `to`.
    ///
    /// The first `damping_steps` of `steps + damping_steps` equal steps are
    /// taken with implicit Euler, the remaining `steps` with the configured
    /// scheme.
    ///
    /// # Errors
    /// `Precondition` for an empty or reversed interval, and any error of
    /// the scheme (a singular pivot or a non-converging Krylov solve).
    pub fn rollback(
        &mut self,
        a: &mut [Real],
        from: Time,
        to: Time,
        steps: Size,
        damping_steps: Size,
    ) -> Result<()> {
        let desc = self.scheme_desc;
        let bc = self.bc_set;
        let condition = &mut *self.condition;
        let map = &mut *self.map;

        let all_steps = steps + damping_steps;
        let damping_to = from - (from - to) * damping_steps as Real / all_steps as Real;
        debug!(
            scheme = %desc.scheme_type,
            from,
            to,
            steps,
            damping_steps,
            stopping_times = ?condition.stopping_times(),
            "backward rollback"
        );

        if damping_steps > 0 && desc.scheme_type != FdmSchemeType::ImplicitEuler {
            let damping = ImplicitEulerScheme::new(&mut *map, bc);
            roll(damping, condition, a, from, damping_to, damping_steps)?;
        }

        match desc.scheme_type {
            FdmSchemeType::Hundsdorfer => {
                let s = HundsdorferScheme::new(desc.theta, desc.mu, map, bc);
                roll(s, condition, a, damping_to, to, steps)
            }
            FdmSchemeType::Douglas => {
                let s = DouglasScheme::new(desc.theta, map, bc);
                roll(s, condition, a, damping_to, to, steps)
            }
            FdmSchemeType::CrankNicolson => {
                let s = CrankNicolsonScheme::new(desc.theta, map, bc);
                roll(s, condition, a, damping_to, to, steps)
            }
            FdmSchemeType::CraigSneyd => {
                let s = CraigSneydScheme::new(desc.theta, desc.mu, map, bc);
                roll(s, condition, a, damping_to, to, steps)
            }
            FdmSchemeType::ModifiedCraigSneyd => {
                let s = ModifiedCraigSneydScheme::new(desc.theta, desc.mu, map, bc);
                roll(s, condition, a, damping_to, to, steps)
            }
            FdmSchemeType::ImplicitEuler => {
                let s = ImplicitEulerScheme::new(map, bc);
                roll(s, condition, a, from, to, all_steps)
            }
            FdmSchemeType::ExplicitEuler => {
                let s = ExplicitEulerScheme::new(map, bc);
                roll(s, condition, a, damping_to, to, steps)
            }
            FdmSchemeType::MethodOfLines => {
                let s = MethodOfLinesScheme::new(desc.theta, desc.mu, map, bc);
                roll(s, condition, a, damping_to, to, steps)
            }
            FdmSchemeType::TrBDF2 => {
                let s = TrBDF2Scheme::new(desc.theta, map, bc, desc.mu);
                roll(s, condition, a, damping_to, to, steps)
            }
        }
    }
}

fn roll<E: FdmEvolver>(
    evolver: E,
    condition: &mut FdmStepConditionComposite,
    a: &mut [Real],
    from: Time,
    to: Time,
    steps: Size,
) -> Result<()> {
    let stopping_times = condition.stopping_times().to_vec();
    FiniteDifferenceModel::new(evolver, stopping_times).rollback(a, from, to, steps, Some(condition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::schemes::test_support::*;
    use approx::assert_abs_diff_eq;

    fn price(desc: FdmSchemeDesc, size: Size, steps: Size, damping: Size) -> Real {
        let mut problem = put_problem(size);
        let bc = FdmBoundaryConditionSet::new();
        let mut condition = FdmStepConditionComposite::default();
        let mut a = problem.payoff.clone();
        FdmBackwardSolver::new(&mut problem.op, &bc, &mut condition, desc)
            .rollback(&mut a, MATURITY, 0.0, steps, damping)
            .unwrap();
        value_at_spot(&problem.mesher, &a)
    }

    #[test]
    fn every_scheme_prices_the_european_put() {
        let schemes = [
            (FdmSchemeDesc::douglas(), 100),
            (FdmSchemeDesc::crank_nicolson(), 100),
            (FdmSchemeDesc::implicit_euler(), 400),
            (FdmSchemeDesc::explicit_euler(), 1000),
            (FdmSchemeDesc::craig_sneyd(), 100),
            (FdmSchemeDesc::modified_craig_sneyd(), 100),
            (FdmSchemeDesc::hundsdorfer(), 100),
            (FdmSchemeDesc::modified_hundsdorfer(), 100),
            (FdmSchemeDesc::method_of_lines(1e-3, 0.1), 20),
            (FdmSchemeDesc::trbdf2(), 100),
        ];
        for (desc, steps) in schemes {
            let p = price(desc, 100, steps, 0);
            assert!(
                (p - ATM_PUT).abs() < 0.03,
                "{} priced {p}, expected {ATM_PUT}",
                desc.scheme_type
            );
        }
    }

    #[test]
    fn damping_keeps_the_price() {
        let plain = price(FdmSchemeDesc::crank_nicolson(), 200, 100, 0);
        let damped = price(FdmSchemeDesc::crank_nicolson(), 200, 100, 4);
        assert_abs_diff_eq!(damped, ATM_PUT, epsilon = 0.02);
        assert_abs_diff_eq!(damped, plain, epsilon = 0.01);
    }

    #[test]
    fn implicit_euler_absorbs_the_damping_steps() {
        let split = price(FdmSchemeDesc::implicit_euler(), 80, 30, 10);
        let whole = price(FdmSchemeDesc::implicit_euler(), 80, 40, 0);
        assert_abs_diff_eq!(split, whole, epsilon = 1e-12);
    }

    #[test]
    fn no_steps_is_an_error() {
        let mut problem = put_problem(20);
        let bc = FdmBoundaryConditionSet::new();
        let mut condition = FdmStepConditionComposite::default();
        let mut a = problem.payoff.clone();
        let mut solver =
            FdmBackwardSolver::new(&mut problem.op, &bc, &mut condition, FdmSchemeDesc::douglas());
        assert!(solver.rollback(&mut a, MATURITY, 0.0, 0, 0).is_err());
    }
}
