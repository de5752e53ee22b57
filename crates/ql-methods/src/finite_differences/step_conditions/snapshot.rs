//! Copy of the solution at one time (translates `fdmsnapshotcondition.hpp`).

use ql_core::{Real, Time};

/// Records the array handed to it at `time`.
///
/// Used to take the values one small step before the valuation time, from
/// which theta is computed.
///
/// Corresponds to `QuantLib::FdmSnapshotCondition`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmSnapshotCondition {
    time: Time,
    values: Option<Vec<Real>>,
}

impl FdmSnapshotCondition {
    /// Snapshot at `time`.
    pub fn new(time: Time) -> Self {
        Self { time, values: None }
    }

    /// The snapshot time.
    pub fn time(&self) -> Time {
        self.time
    }

    /// The recorded values, if the rollback passed through `time`.
    pub fn values(&self) -> Option<&[Real]> {
        self.values.as_deref()
    }

    /// Copy `a` if `t` is the snapshot time.
    pub fn apply_to(&mut self, a: &[Real], t: Time) {
        if (t - self.time).abs() < 1e-12 {
            self.values = Some(a.to_vec());
        }
    }
}
