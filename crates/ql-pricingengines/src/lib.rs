//! # ql-pricingengines
//!
//! The finite-difference Black-Scholes engine for vanilla options.
//!
//! [`FdBlackScholesVanillaEngine`] prices European, American and Bermudan
//! calls and puts on a log-spot grid, with discrete cash dividends (spot or
//! escrowed model) and an optional quanto drift adjustment. Configure it
//! through [`MakeFdBlackScholesVanillaEngine`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fd_black_scholes_vanilla_engine;

pub use fd_black_scholes_vanilla_engine::{
    CashDividendModel, FdBlackScholesVanillaEngine, FdBlackScholesVanillaSettings,
    MakeFdBlackScholesVanillaEngine,
};
