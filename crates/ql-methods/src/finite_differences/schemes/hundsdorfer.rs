//! Hundsdorfer-Verwer ADI (translates `hundsdorferscheme.hpp`).

use super::{directional_solves, douglas_predictor, require_step, start_step, FdmEvolver};
use crate::finite_differences::{
    axpy, boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite, sub,
};
use ql_core::{errors::Result, Real, Time};

/// Douglas predictor followed by a second explicit stage over the whole
/// operator and a second round of directional solves around the predicted
/// value:
///
/// ```text
/// yt = y0 + μ·dt·L(y - a)
/// yt = (I - θ·dt·L_i)⁻¹ (yt - θ·dt·L_i y)
/// ```
///
/// Corresponds to `QuantLib::HundsdorferScheme`.
#[derive(Debug)]
pub struct HundsdorferScheme<'a> {
    theta: Real,
    mu: Real,
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    dt: Option<Time>,
}

impl<'a> HundsdorferScheme<'a> {
    /// Scheme with implicitness `theta` and corrector weight `mu`.
    pub fn new(
        theta: Real,
        mu: Real,
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            theta,
            mu,
            map,
            bc_set,
            dt: None,
        }
    }
}

impl FdmEvolver for HundsdorferScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        let dt = require_step(self.dt)?;
        start_step(self.map, self.bc_set, t, dt)?;
        let map: &dyn FdmLinearOpComposite = self.map;

        let (mut yt, y) = douglas_predictor(map, self.bc_set, a, self.theta, dt)?;
        axpy(&mut yt, self.mu * dt, &map.apply(&sub(&y, a)));
        self.bc_set.apply_after_applying(&mut yt);

        let mut yt = directional_solves(map, yt, &y, self.theta, dt)?;
        self.bc_set.apply_after_solving(&mut yt);
        a.copy_from_slice(&yt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{test_support::*, FdmSchemeDesc};
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn prices_the_european_put() {
        let desc = FdmSchemeDesc::hundsdorfer();
        let mut problem = put_problem(200);
        let bc = FdmBoundaryConditionSet::new();
        let mut a = problem.payoff.clone();
        let mut scheme = HundsdorferScheme::new(desc.theta, desc.mu, &mut problem.op, &bc);
        roll(&mut scheme, &mut a, MATURITY, 100);
        let price = value_at_spot(&problem.mesher, &a);
        assert_abs_diff_eq!(price, ATM_PUT, epsilon = 0.02);
    }

    #[test]
    fn decays_the_heat_mode() {
        let desc = FdmSchemeDesc::modified_hundsdorfer();
        let mut op = HeatOp2d::new(21);
        let mut a = op.mode();
        let bc = FdmBoundaryConditionSet::new();
        let mut scheme = HundsdorferScheme::new(desc.theta, desc.mu, &mut op, &bc);
        roll(&mut scheme, &mut a, HEAT_TIME, 50);
        assert_abs_diff_eq!(op.centre(&a), HeatOp2d::expected_centre(), epsilon = 5e-3);
    }
}
