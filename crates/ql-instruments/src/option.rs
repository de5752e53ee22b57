//! Vanilla options (translates `ql/instruments/vanillaoption.hpp`).

use crate::{
    exercise::Exercise,
    instrument::{PricingEngine, PricingResults},
    payoff::{OptionType, PlainVanillaPayoff, StrikedPayoff},
};
use ql_core::{errors::Result, Real, Time};
use std::sync::Arc;

/// Arguments handed to a vanilla-option pricing engine.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
}

/// A plain vanilla option on a single underlying asset.
///
/// Corresponds to `QuantLib::VanillaOption`.
#[derive(Debug, Clone)]
pub struct VanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
}

impl VanillaOption {
    /// Create a new vanilla option.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }

    /// Convenience: a plain-vanilla call/put with the given exercise.
    pub fn plain(option_type: OptionType, strike: Real, exercise: Exercise) -> Self {
        Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            exercise,
        )
    }

    /// Convenience: a European call/put expiring at `expiry`.
    pub fn european(option_type: OptionType, strike: Real, expiry: Time) -> Self {
        Self::plain(option_type, strike, Exercise::european(expiry))
    }

    /// The payoff.
    pub fn payoff(&self) -> &Arc<dyn StrikedPayoff> {
        &self.payoff
    }

    /// The exercise specification.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// The engine arguments for this option.
    pub fn arguments(&self) -> VanillaOptionArguments {
        VanillaOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise.clone(),
        }
    }

    /// Price this option using the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<VanillaOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}
