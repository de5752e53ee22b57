//! # ql-math
//!
//! Numerical collaborators consumed by the finite-difference framework:
//! floating-point comparison, the normal distribution (via statrs), Brent
//! root finding with bracket search, adaptive Runge-Kutta integration,
//! Simpson quadrature, linear and monotone cubic interpolation, and the
//! BiCGStab iterative solver (over nalgebra vectors).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Floating-point comparison utilities.
pub mod comparison;

/// Probability distributions.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// 1D interpolation schemes.
pub mod interpolations;

/// Iterative linear solvers.
pub mod linear;

/// Ordinary differential equations.
pub mod ode;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use comparison::{close, close_enough};
pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf, InverseCumulativeNormal};
pub use integrals::{Integrator, SimpsonIntegral};
pub use interpolations::{Interpolation1D, LinearInterpolation, MonotonicCubicNaturalSpline};
pub use linear::{BiCGStab, BiCGStabResult};
pub use ode::AdaptiveRungeKutta;
pub use solvers1d::Brent;
