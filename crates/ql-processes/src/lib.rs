//! # ql-processes
//!
//! The generalized Black-Scholes process: a spot value bundled with the
//! risk-free, dividend-yield and Black volatility term structures that the
//! finite-difference operators and grid builders read from.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_scholes_process;

pub use black_scholes_process::{
    black_scholes_merton_process, black_scholes_process, GeneralizedBlackScholesProcess,
};
