//! # quantlib-fdm
//!
//! A finite-difference rollback engine for American and Bermudan options,
//! translated from the PDE framework of [QuantLib](https://www.quantlib.org/).
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `ql-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! quantlib-fdm = "0.1"
//! ```
//!
//! ```rust
//! use quantlib_fdm::instruments::{Exercise, OptionType, VanillaOption};
//! use quantlib_fdm::pricingengines::MakeFdBlackScholesVanillaEngine;
//! use quantlib_fdm::processes::GeneralizedBlackScholesProcess;
//! use std::sync::Arc;
//!
//! let process = Arc::new(GeneralizedBlackScholesProcess::flat(100.0, 0.05, 0.0, 0.2));
//! let engine = MakeFdBlackScholesVanillaEngine::new(process)
//!     .with_cash_dividends(&[0.5], &[2.0])?
//!     .build();
//!
//! let put = VanillaOption::plain(OptionType::Put, 100.0, Exercise::american(0.0, 1.0)?);
//! let results = put.price(&engine)?;
//! assert!(results.npv > 0.0);
//! assert!(results.result("delta").is_some());
//! # Ok::<(), quantlib_fdm::core::Error>(())
//! ```
//!
//! The library emits `tracing` events but installs no subscriber.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use ql_core as core;

/// Numerical collaborators: root finding, ODE, splines, BiCGStab.
pub use ql_math as math;

/// Yield and Black volatility term structures.
pub use ql_termstructures as termstructures;

/// The generalized Black-Scholes process.
pub use ql_processes as processes;

/// Payoffs, exercise schedules, dividends and engine plumbing.
pub use ql_instruments as instruments;

/// The finite-difference framework.
pub use ql_methods as methods;

/// The finite-difference vanilla engine.
pub use ql_pricingengines as pricingengines;
