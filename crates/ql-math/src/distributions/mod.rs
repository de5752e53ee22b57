//! Probability distributions (translates `ql/math/distributions/`).
//!
//! Only the Gaussian is needed by the grid builders; it delegates to the
//! `statrs` crate.

pub mod normal;

pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf, InverseCumulativeNormal};
