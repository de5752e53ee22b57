//! One-dimensional solve with spline read-out (translates `fdm1dimsolver.hpp`).

use super::{FdmBackwardSolver, FdmSolverDesc};
use crate::finite_differences::{
    operators::FdmLinearOpComposite,
    schemes::FdmSchemeDesc,
    step_conditions::{FdmSnapshotCondition, FdmStepConditionComposite},
    utilities::FdmInnerValueCalculator,
};
use ql_core::{errors::Result, Real, Time};
use ql_math::{Interpolation1D, MonotonicCubicNaturalSpline};
use tracing::debug;

/// Rolls the payoff back from maturity to zero on a one-dimensional grid and
/// interpolates the result with a monotonic cubic natural spline.
///
/// A snapshot shortly before zero is taken along the way; theta is the
/// difference quotient between it and the final values.
///
/// Corresponds to `QuantLib::Fdm1DimSolver`.
#[derive(Debug, Clone)]
pub struct Fdm1DimSolver {
    x: Vec<Real>,
    values: Vec<Real>,
    interpolation: MonotonicCubicNaturalSpline,
    theta: Option<(Time, MonotonicCubicNaturalSpline)>,
}

impl Fdm1DimSolver {
    /// Solve `solver_desc` with `op` and `scheme_desc`.
    ///
    /// # Errors
    /// `Precondition` if the mesher is not one-dimensional, and any rollback
    /// or spline construction error.
    pub fn new(
        solver_desc: &FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        op: &mut dyn FdmLinearOpComposite,
    ) -> Result<Self> {
        let mesher = &solver_desc.mesher;
        ql_core::ensure!(
            mesher.dimensions() == 1,
            "one-dimensional mesher expected, got {} dimensions",
            mesher.dimensions()
        );

        let maturity = solver_desc.maturity;
        let first_stop = solver_desc
            .condition
            .stopping_times()
            .first()
            .copied()
            .unwrap_or(maturity);
        let snapshot = FdmSnapshotCondition::new(0.99 * first_stop.min(1.0 / 365.0));
        let mut condition = FdmStepConditionComposite::join_conditions(
            Some(snapshot),
            solver_desc.condition.clone(),
        );
        debug!(
            points = mesher.layout().size(),
            maturity,
            steps = solver_desc.time_steps,
            damping_steps = solver_desc.damping_steps,
            "one-dimensional solve"
        );

        let calculator: &dyn FdmInnerValueCalculator = solver_desc.calculator.as_ref();
        let mut values: Vec<Real> = mesher
            .layout()
            .iter()
            .map(|it| calculator.avg_inner_value(&it, maturity))
            .collect();

        FdmBackwardSolver::new(op, &solver_desc.bc_set, &mut condition, scheme_desc).rollback(
            &mut values,
            maturity,
            0.0,
            solver_desc.time_steps,
            solver_desc.damping_steps,
        )?;

        let x = mesher.locations(0);
        let interpolation = MonotonicCubicNaturalSpline::new(&x, &values)?;

        let starts_at_zero = condition.stopping_times().first() == Some(&0.0);
        let theta = match condition.snapshot() {
            Some(s) if !starts_at_zero => match s.values() {
                Some(v) => Some((s.time(), MonotonicCubicNaturalSpline::new(&x, v)?)),
                None => None,
            },
            _ => None,
        };

        Ok(Self {
            x,
            values,
            interpolation,
            theta,
        })
    }

    /// The solution at `x`.
    pub fn interpolate_at(&self, x: Real) -> Real {
        self.interpolation.operator(x)
    }

    /// First derivative of the solution at `x`.
    pub fn derivative_x(&self, x: Real) -> Real {
        self.interpolation.derivative(x)
    }

    /// Second derivative of the solution at `x`.
    pub fn derivative_xx(&self, x: Real) -> Real {
        self.interpolation.second_derivative(x)
    }

    /// `(V(t_snap, x) - V(0, x)) / t_snap`.
    ///
    /// `None` when a stopping time sits at zero or the snapshot was never
    /// reached.
    pub fn theta_at(&self, x: Real) -> Option<Real> {
        self.theta
            .as_ref()
            .map(|(t, spline)| (spline.operator(x) - self.interpolate_at(x)) / t)
    }

    /// Grid locations.
    pub fn locations(&self) -> &[Real] {
        &self.x
    }

    /// Solution values at the grid locations.
    pub fn result_values(&self) -> &[Real] {
        &self.values
    }
}
