//! Option exercise types.
//!
//! Translates `ql/exercise.hpp`.
//!
//! An `Exercise` defines *when* an option can be exercised. Dates are
//! replaced by year fractions from the valuation time.

use ql_core::{errors::Result, Time};
use std::fmt;

/// Type of exercise right.
///
/// Corresponds to `QuantLib::Exercise::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
    /// Can be exercised on specific dates.
    Bermudan,
}

/// Exercise specification for an option.
///
/// Corresponds to `QuantLib::Exercise` and its subclasses.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    exercise_type: ExerciseType,
    /// - European: single time (the expiry).
    /// - American: two times (earliest, latest).
    /// - Bermudan: sorted, de-duplicated exercise times.
    times: Vec<Time>,
}

impl Exercise {
    /// Create a European exercise (single expiry time).
    pub fn european(expiry: Time) -> Self {
        Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        }
    }

    /// Create an American exercise (earliest to latest).
    pub fn american(earliest: Time, latest: Time) -> Result<Self> {
        ql_core::ensure!(
            earliest <= latest,
            "earliest exercise ({earliest}) later than latest exercise ({latest})"
        );
        Ok(Self {
            exercise_type: ExerciseType::American,
            times: vec![earliest, latest],
        })
    }

    /// Create a Bermudan exercise from a set of exercise times.
    pub fn bermudan(mut times: Vec<Time>) -> Result<Self> {
        ql_core::ensure!(!times.is_empty(), "no exercise times given");
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        Ok(Self {
            exercise_type: ExerciseType::Bermudan,
            times,
        })
    }

    /// The last possible exercise time.
    pub fn last_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All exercise times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.times[0]),
            ExerciseType::American => {
                write!(f, "American({} – {})", self.times[0], self.last_time())
            }
            ExerciseType::Bermudan => {
                write!(f, "Bermudan({} times)", self.times.len())
            }
        }
    }
}
