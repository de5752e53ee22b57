//! A yield curve defined by an arbitrary zero-rate function of time.
//!
//! Useful for injecting time-dependent rates into the finite-difference
//! operators without building an interpolated curve.

use std::fmt;

use crate::yield_term_structure::YieldTermStructure;
use ql_core::{Rate, Time};

/// Yield curve whose continuously-compounded zero rate is `f(t)`.
pub struct ZeroCurveFn<F> {
    zero_rate: F,
}

impl<F> ZeroCurveFn<F>
where
    F: Fn(Time) -> Rate + Send + Sync,
{
    /// Wrap a zero-rate function.
    pub fn new(zero_rate: F) -> Self {
        Self { zero_rate }
    }
}

impl<F> fmt::Debug for ZeroCurveFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZeroCurveFn").finish_non_exhaustive()
    }
}

impl<F> YieldTermStructure for ZeroCurveFn<F>
where
    F: Fn(Time) -> Rate + Send + Sync,
{
    fn zero_rate_impl(&self, t: Time) -> Rate {
        (self.zero_rate)(t)
    }
}
