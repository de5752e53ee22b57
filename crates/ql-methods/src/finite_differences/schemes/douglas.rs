//! Douglas ADI (translates `douglasscheme.hpp`).

use super::{douglas_predictor, require_step, start_step, FdmEvolver};
use crate::finite_differences::{
    boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite,
};
use ql_core::{errors::Result, Real, Time};

/// Explicit predictor over the whole operator, then one implicit correction
/// per direction. In one dimension with θ = 1/2 this is Crank-Nicolson.
///
/// Corresponds to `QuantLib::DouglasScheme`.
#[derive(Debug)]
pub struct DouglasScheme<'a> {
    theta: Real,
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    dt: Option<Time>,
}

impl<'a> DouglasScheme<'a> {
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
            dt: None,
        }
    }
}

impl FdmEvolver for DouglasScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        let dt = require_step(self.dt)?;
        start_step(self.map, self.bc_set, t, dt)?;
        let (_, mut y) = douglas_predictor(self.map, self.bc_set, a, self.theta, dt)?;
        self.bc_set.apply_after_solving(&mut y);
        a.copy_from_slice(&y);
        Ok(())
    }
}
