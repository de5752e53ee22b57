//! Option payoff hierarchy.
//!
//! Translates `ql/instruments/payoffs.hpp` and `ql/option.hpp` (Option::Type).
//!
//! Payoffs describe the terminal (or exercise) payoff of an option as a
//! function of the underlying asset price. The finite-difference inner-value
//! calculators evaluate them on grid points and cell averages.

use ql_core::Real;
use std::{fmt, sync::Arc};

/// Option type (call or put).
///
/// Corresponds to `QuantLib::Option::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// A call option (right to buy).
    Call,
    /// A put option (right to sell).
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Base trait for option payoffs.
///
/// Corresponds to `QuantLib::Payoff`.
pub trait Payoff: fmt::Debug + Send + Sync {
    /// Compute the payoff given the underlying price at exercise/expiry.
    fn value(&self, price: Real) -> Real;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> String {
        self.name().to_string()
    }
}

/// A payoff depending on a strike price.
///
/// Corresponds to `QuantLib::StrikedTypePayoff`.
pub trait StrikedPayoff: Payoff {
    /// The strike price.
    fn strike(&self) -> Real;

    /// The option type (call / put).
    fn option_type(&self) -> OptionType;

    /// The same payoff behind the base trait.
    fn into_payoff(self: Arc<Self>) -> Arc<dyn Payoff>;
}

/// Standard "plain vanilla" European/American option payoff.
///
/// `payoff = max(φ(S − K), 0)` where `φ = +1` for Call, `−1` for Put.
///
/// Corresponds to `QuantLib::PlainVanillaPayoff`.
#[derive(Debug, Clone)]
pub struct PlainVanillaPayoff {
    /// Option type.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Real,
}

impl PlainVanillaPayoff {
    /// Create a new plain vanilla payoff.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self {
            option_type,
            strike,
        }
    }
}

impl Payoff for PlainVanillaPayoff {
    fn value(&self, price: Real) -> Real {
        (self.option_type.sign() * (price - self.strike)).max(0.0)
    }

    fn name(&self) -> &str {
        "Vanilla"
    }

    fn description(&self) -> String {
        format!("{} {} @ {}", self.name(), self.option_type, self.strike)
    }
}

impl StrikedPayoff for PlainVanillaPayoff {
    fn strike(&self) -> Real {
        self.strike
    }

    fn option_type(&self) -> OptionType {
        self.option_type
    }

    fn into_payoff(self: Arc<Self>) -> Arc<dyn Payoff> {
        self
    }
}

/// Cash-or-nothing payoff: pays a fixed amount if in the money.
///
/// `payoff = cashPayoff` if `φ(S − K) > 0`, else 0.
///
/// Corresponds to `QuantLib::CashOrNothingPayoff`.
#[derive(Debug, Clone)]
pub struct CashOrNothingPayoff {
    /// Option type.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Real,
    /// Fixed cash payoff.
    pub cash_payoff: Real,
}

impl CashOrNothingPayoff {
    /// Create a new cash-or-nothing payoff.
    pub fn new(option_type: OptionType, strike: Real, cash_payoff: Real) -> Self {
        Self {
            option_type,
            strike,
            cash_payoff,
        }
    }
}

impl Payoff for CashOrNothingPayoff {
    fn value(&self, price: Real) -> Real {
        if self.option_type.sign() * (price - self.strike) > 0.0 {
            self.cash_payoff
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "CashOrNothing"
    }
}

impl StrikedPayoff for CashOrNothingPayoff {
    fn strike(&self) -> Real {
        self.strike
    }

    fn option_type(&self) -> OptionType {
        self.option_type
    }

    fn into_payoff(self: Arc<Self>) -> Arc<dyn Payoff> {
        self
    }
}
