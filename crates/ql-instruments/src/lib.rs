//! # ql-instruments
//!
//! The thin contract layer the finite-difference engine prices against:
//! option payoffs, exercise schedules expressed in year fractions, discrete
//! cash dividends, and the `PricingEngine` / `PricingResults` pair.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dividend;
pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;

pub use dividend::{dividend_vector, Dividend};
pub use exercise::{Exercise, ExerciseType};
pub use instrument::{PricingEngine, PricingResults};
pub use option::{VanillaOption, VanillaOptionArguments};
pub use payoff::{CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
