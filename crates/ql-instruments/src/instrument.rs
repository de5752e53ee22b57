//! Pricing engine plumbing.
//!
//! Translates the engine/results half of `ql/instrument.hpp` and
//! `ql/pricingengine.hpp`. There is no observer machinery: an engine is a
//! pure function from instrument arguments to results.

use ql_core::{errors::Result, Real};
use std::collections::HashMap;

/// Results of pricing an instrument.
///
/// Contains the NPV and optionally additional named results
/// (e.g. "delta", "gamma", "theta").
#[derive(Debug, Clone, Default)]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Error estimate (e.g. from MC simulation).
    pub error_estimate: Option<Real>,
    /// Additional named results.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Create pricing results with just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            error_estimate: None,
            additional_results: HashMap::new(),
        }
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// Look up a named result.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }
}

/// Base trait for all pricing engines.
///
/// A pricing engine computes `PricingResults` for a specific instrument type.
///
/// Corresponds to `QuantLib::PricingEngine`.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}
