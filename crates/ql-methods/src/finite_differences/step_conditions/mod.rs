//! Conditions applied to the solution at the end of each rollback step
//! (translates `ql/methods/finitedifferences/stepconditions/`).
//!
//! The set of conditions is closed, so [`FdmStepCondition`] is an enum and
//! dispatch is a single `match`. Conditions that only act at particular
//! times rely on the rollback landing exactly on them; those times are
//! collected in [`FdmStepConditionComposite::stopping_times`].

pub mod american;
pub mod bermudan;
pub mod composite;
pub mod dividend;
pub mod snapshot;

pub use american::FdmAmericanStepCondition;
pub use bermudan::FdmBermudanStepCondition;
pub use composite::FdmStepConditionComposite;
pub use dividend::FdmDividendHandler;
pub use snapshot::FdmSnapshotCondition;

use ql_core::{errors::Result, Real, Time};

/// A condition applied to the solution array after a step.
///
/// Corresponds to `QuantLib::StepCondition<Array>`.
#[derive(Debug, Clone)]
pub enum FdmStepCondition {
    /// Exercise at every step.
    American(FdmAmericanStepCondition),
    /// Exercise on a schedule.
    Bermudan(FdmBermudanStepCondition),
    /// Cash dividend jumps.
    Dividend(FdmDividendHandler),
    /// Record the solution at one time.
    Snapshot(FdmSnapshotCondition),
    /// Several conditions in order.
    Composite(FdmStepConditionComposite),
}

impl FdmStepCondition {
    /// Apply the condition to `a`, the solution at time `t`.
    ///
    /// # Errors
    /// Only the dividend handler can fail (degenerate interpolation grid).
    pub fn apply_to(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        match self {
            Self::American(c) => c.apply_to(a, t),
            Self::Bermudan(c) => c.apply_to(a, t),
            Self::Dividend(c) => c.apply_to(a, t)?,
            Self::Snapshot(c) => c.apply_to(a, t),
            Self::Composite(c) => c.apply_to(a, t)?,
        }
        Ok(())
    }
}
