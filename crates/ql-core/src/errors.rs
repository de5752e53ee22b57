//! Error types for the finite-difference workspace.
//!
//! Everything that can go wrong while building a grid or rolling a solution
//! back is reported through a single `thiserror`-derived enum. The C++ macros
//! `QL_REQUIRE`, `QL_ENSURE`, and `QL_FAIL` map to the `ensure!`,
//! `ensure_post!` and `fail!` convenience macros defined here.
//!
//! Two families of failure are distinguished:
//!
//! * **configuration errors** (`Precondition`, `InvalidArgument`,
//!   `IndexOutOfRange`): bad bounds, mismatched sizes, non-positive accuracy;
//! * **numerical non-convergence** (`NotBracketed`, `MaxEvaluationsExceeded`,
//!   `SingularPivot`, `NotConverged`): fatal for the pricing request, the
//!   caller may retry with different grid or step parameters.

use thiserror::Error;

/// The top-level error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error (maps to `QL_FAIL`).
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated (maps to `QL_REQUIRE`).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated (maps to `QL_ENSURE`).
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Not implemented.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A root finder could not bracket a sign change.
    #[error("unable to bracket root in {evaluations} function evaluations (last bracket attempt: f[{x_min}, {x_max}] -> [{f_min}, {f_max}])")]
    NotBracketed {
        /// Number of evaluations spent searching.
        evaluations: usize,
        /// Lower end of the last bracket attempt.
        x_min: f64,
        /// Upper end of the last bracket attempt.
        x_max: f64,
        /// Function value at `x_min`.
        f_min: f64,
        /// Function value at `x_max`.
        f_max: f64,
    },

    /// An iterative routine ran out of its evaluation budget.
    #[error("{routine}: maximum number of function evaluations ({max}) exceeded")]
    MaxEvaluationsExceeded {
        /// Name of the routine.
        routine: &'static str,
        /// The exhausted budget.
        max: usize,
    },

    /// A (near) zero pivot was met while solving a tridiagonal system.
    #[error("singular tridiagonal system: zero pivot at row {row}")]
    SingularPivot {
        /// Row at which the pivot vanished.
        row: usize,
    },

    /// An iterative linear solver failed to reach its tolerance.
    #[error("{routine}: tolerance {tolerance:e} not reached after {iterations} iterations (residual {residual:e})")]
    NotConverged {
        /// Name of the routine.
        routine: &'static str,
        /// Iterations performed.
        iterations: usize,
        /// Requested tolerance.
        tolerance: f64,
        /// Residual reached.
        residual: f64,
    },
}

impl Error {
    /// `true` for failures of an iterative numerical routine, as opposed to
    /// configuration errors.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Error::NotBracketed { .. }
                | Error::MaxEvaluationsExceeded { .. }
                | Error::SingularPivot { .. }
                | Error::NotConverged { .. }
        )
    }
}

/// Shorthand `Result` type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Equivalent to C++ `QL_REQUIRE(condition, message)`.
///
/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Equivalent to C++ `QL_ENSURE(condition, message)`.
///
/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> ql_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Equivalent to C++ `QL_FAIL(message)`.
///
/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use ql_core::{fail, errors::Error};
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked_size(n: usize) -> Result<usize> {
        ensure!(n >= 2, "grid needs at least two points, got {n}");
        Ok(n)
    }

    #[test]
    fn ensure_returns_precondition() {
        assert_eq!(checked_size(3), Ok(3));
        match checked_size(1) {
            Err(Error::Precondition(msg)) => assert!(msg.contains("got 1")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn numerical_errors_are_classified() {
        assert!(Error::SingularPivot { row: 3 }.is_numerical());
        assert!(Error::MaxEvaluationsExceeded {
            routine: "Brent",
            max: 100
        }
        .is_numerical());
        assert!(!Error::Precondition("bad bounds".into()).is_numerical());
    }

    #[test]
    fn messages_carry_context() {
        let e = Error::NotConverged {
            routine: "SOR",
            iterations: 100_000,
            tolerance: 1e-8,
            residual: 1e-3,
        };
        let msg = e.to_string();
        assert!(msg.contains("SOR"));
        assert!(msg.contains("100000"));
    }
}
