//! Black-Scholes solve in log-spot (translates `fdmblackscholessolver.hpp`).

use super::{Fdm1DimSolver, FdmSolverDesc};
use crate::finite_differences::{
    operators::FdmBlackScholesOp, schemes::FdmSchemeDesc, utilities::FdmQuantoHelper,
};
use ql_core::{errors::Result, Real};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// [`Fdm1DimSolver`] over an [`FdmBlackScholesOp`], read out in spot
/// rather than log-spot.
///
/// Corresponds to `QuantLib::FdmBlackScholesSolver`.
#[derive(Debug, Clone)]
pub struct FdmBlackScholesSolver {
    solver: Fdm1DimSolver,
}

impl FdmBlackScholesSolver {
    /// Solve `solver_desc` for `process` with the variance taken at
    /// `strike`.
    ///
    /// # Errors
    /// Propagates [`Fdm1DimSolver::new`] errors.
    pub fn new(
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        solver_desc: &FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        quanto_helper: Option<Arc<FdmQuantoHelper>>,
    ) -> Result<Self> {
        let mut op = FdmBlackScholesOp::new(
            Arc::clone(&solver_desc.mesher),
            process,
            strike,
            0,
            quanto_helper,
        );
        let solver = Fdm1DimSolver::new(solver_desc, scheme_desc, &mut op)?;
        Ok(Self { solver })
    }

    /// Value at spot `s`.
    pub fn value_at(&self, s: Real) -> Real {
        self.solver.interpolate_at(s.ln())
    }

    /// `∂V/∂S = V_x / S`.
    pub fn delta_at(&self, s: Real) -> Real {
        self.solver.derivative_x(s.ln()) / s
    }

    /// `∂²V/∂S² = (V_xx - V_x) / S²`.
    pub fn gamma_at(&self, s: Real) -> Real {
        let x = s.ln();
        (self.solver.derivative_xx(x) - self.solver.derivative_x(x)) / (s * s)
    }

    /// Calendar-time theta at `s`, if the solve recorded one.
    pub fn theta_at(&self, s: Real) -> Option<Real> {
        self.solver.theta_at(s.ln())
    }

    /// The underlying log-spot solver.
    pub fn solver(&self) -> &Fdm1DimSolver {
        &self.solver
    }
}
