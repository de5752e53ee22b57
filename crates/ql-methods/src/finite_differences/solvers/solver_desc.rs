//! Inputs of a finite-difference solve (translates `fdmsolverdesc.hpp`).

use crate::finite_differences::{
    boundary_conditions::FdmBoundaryConditionSet, meshers::FdmMesherComposite,
    step_conditions::FdmStepConditionComposite, utilities::FdmInnerValueCalculator,
};
use ql_core::{Size, Time};
use std::sync::Arc;

/// Everything a solver needs apart from the operator and the scheme.
///
/// Corresponds to `QuantLib::FdmSolverDesc`.
#[derive(Debug, Clone)]
pub struct FdmSolverDesc {
    /// The grid.
    pub mesher: Arc<FdmMesherComposite>,
    /// Boundary conditions applied by the schemes.
    pub bc_set: FdmBoundaryConditionSet,
    /// Step conditions and their stopping times.
    pub condition: FdmStepConditionComposite,
    /// Terminal payoff on the grid.
    pub calculator: Arc<dyn FdmInnerValueCalculator>,
    /// Time to maturity; the rollback starts here.
    pub maturity: Time,
    /// Steps of the main scheme.
    pub time_steps: Size,
    /// Implicit Euler steps taken before the main scheme.
    pub damping_steps: Size,
}
