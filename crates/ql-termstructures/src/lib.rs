//! # ql-termstructures
//!
//! Market data as seen by the finite-difference engine: discount curves and
//! Black volatility surfaces, addressed by year fractions rather than dates.
//! Only flat and closure-backed implementations are provided.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `YieldTermStructure`: yield / interest-rate term structures.
pub mod yield_term_structure;

/// `FlatForward`: constant forward-rate yield curve.
pub mod flat_forward;

/// `ZeroCurveFn`: yield curve backed by a zero-rate closure.
pub mod zero_curve_fn;

/// `BlackVolTermStructure`: Black-volatility term structures and `BlackConstantVol`.
pub mod black_vol_term_structure;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use black_vol_term_structure::{BlackConstantVol, BlackVolTermStructure};
pub use flat_forward::FlatForward;
pub use yield_term_structure::YieldTermStructure;
pub use zero_curve_fn::ZeroCurveFn;
