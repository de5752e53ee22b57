//! Comparison utilities (translates `ql/math/comparison.hpp`).

use ql_core::{Real, QL_EPSILON};

/// Number of ulps used by [`close`] and [`close_enough`] when no explicit
/// multiplier is needed.
pub const DEFAULT_ULPS: u32 = 42;

/// Strict relative comparison: `|a - b|` must be within `42 ε` of *both*
/// `|a|` and `|b|`.
#[inline]
pub fn close(a: Real, b: Real) -> bool {
    close_n(a, b, DEFAULT_ULPS)
}

/// Strict relative comparison with an explicit ulp multiplier.
#[inline]
pub fn close_n(a: Real, b: Real, n: u32) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    let tolerance = n as Real * QL_EPSILON;
    if a == 0.0 || b == 0.0 {
        return diff < tolerance * tolerance;
    }
    diff <= tolerance * a.abs() && diff <= tolerance * b.abs()
}

/// Loose relative comparison: `|a - b|` must be within `n ε` of *either*
/// `|a|` or `|b|`.
#[inline]
pub fn close_enough(a: Real, b: Real, n: u32) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    let tolerance = n as Real * QL_EPSILON;
    if a == 0.0 || b == 0.0 {
        return diff < tolerance * tolerance;
    }
    diff <= tolerance * a.abs() || diff <= tolerance * b.abs()
}
