//! `FlatForward`: a yield term structure with a constant forward rate
//! (translates `ql/termstructures/yield/flatforward.hpp`).
//!
//! This is the simplest possible yield curve: a constant continuously-compounded
//! rate that applies for all maturities.

use crate::yield_term_structure::YieldTermStructure;
use ql_core::{DiscountFactor, Rate, Real, Time};

/// A flat (constant) forward-rate yield term structure.
///
/// Discount factors are computed as `P(t) = exp(-r * t)`.
///
/// Corresponds to `QuantLib::FlatForward`.
#[derive(Debug, Clone, Copy)]
pub struct FlatForward {
    /// The continuously-compounded flat rate.
    rate: Rate,
}

impl FlatForward {
    /// Create a flat-forward curve with a continuously-compounded rate.
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    /// Create a flat-forward curve from a rate compounded `frequency` times
    /// per year.
    pub fn compounded(rate: Rate, frequency: u32) -> Self {
        let f = Real::from(frequency.max(1));
        Self {
            rate: f * (1.0 + rate / f).ln(),
        }
    }

    /// The continuously-compounded flat rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }

    fn zero_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }

    fn forward_rate(&self, _t1: Time, _t2: Time) -> Rate {
        self.rate
    }
}
