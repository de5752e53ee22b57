//! # ql-core
//!
//! Core types and error definitions shared by the finite-difference
//! workspace.
//!
//! This crate provides the foundational building blocks used by every other
//! crate: primitive type aliases and the error taxonomy together with the
//! `ensure!` / `fail!` macros.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` / `ensure_post!` macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor in [0, 1].
pub type DiscountFactor = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

/// Machine epsilon for [`Real`] (maps to C++ `QL_EPSILON`).
pub const QL_EPSILON: Real = f64::EPSILON;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
