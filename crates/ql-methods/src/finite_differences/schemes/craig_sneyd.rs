//! Craig-Sneyd ADI (translates `craigsneydscheme.hpp`).

use super::{directional_solves, douglas_predictor, require_step, start_step, FdmEvolver};
use crate::finite_differences::{
    axpy, boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite, sub,
};
use ql_core::{errors::Result, Real, Time};

/// Douglas predictor, then the mixed-derivative part is corrected
/// explicitly and the directional solves are repeated:
///
/// ```text
/// yt = y0 + μ·dt·L_mixed(y - a)
/// yt = (I - θ·dt·L_i)⁻¹ (yt - θ·dt·L_i a)
/// ```
///
/// Without a mixed part the corrector repeats the Douglas stage.
///
/// Corresponds to `QuantLib::CraigSneydScheme`.
#[derive(Debug)]
pub struct CraigSneydScheme<'a> {
    theta: Real,
    mu: Real,
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    dt: Option<Time>,
}

impl<'a> CraigSneydScheme<'a> {
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

impl FdmEvolver for CraigSneydScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        let dt = require_step(self.dt)?;
        step(self.map, self.bc_set, a, t, dt, self.theta, self.mu)
    }
}

pub(crate) fn step(
    map: &mut dyn FdmLinearOpComposite,
    bc_set: &FdmBoundaryConditionSet,
    a: &mut [Real],
    t: Time,
    dt: Time,
    theta: Real,
    mu: Real,
) -> Result<()> {
    start_step(map, bc_set, t, dt)?;
    let map: &dyn FdmLinearOpComposite = map;

    let (mut yt, y) = douglas_predictor(map, bc_set, a, theta, dt)?;
    axpy(&mut yt, mu * dt, &map.apply_mixed(&sub(&y, a)));
    bc_set.apply_after_applying(&mut yt);

    let mut yt = directional_solves(map, yt, a, theta, dt)?;
    bc_set.apply_after_solving(&mut yt);
    a.copy_from_slice(&yt);
    Ok(())
}
