//! Normal (Gaussian) distribution (translates `ql/math/distributions/normaldistribution.hpp`).
//!
//! Wraps the `statrs` crate's normal distribution to match the QuantLib API.

use ql_core::{errors::Result, Real};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

fn standard() -> Normal {
    Normal::standard()
}

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    standard().pdf(x)
}

/// The standard normal cumulative distribution function Φ(x).
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    standard().cdf(x)
}

/// The inverse standard normal CDF (probit function).
///
/// # Errors
/// Returns an error unless `0 < p < 1`.
pub fn normal_cdf_inverse(p: Real) -> Result<Real> {
    InverseCumulativeNormal::standard().value(p)
}

/// Inverse cumulative normal distribution with mean and standard deviation.
///
/// Corresponds to `QuantLib::InverseCumulativeNormal`.
#[derive(Debug, Clone, Copy)]
pub struct InverseCumulativeNormal {
    average: Real,
    sigma: Real,
}

impl InverseCumulativeNormal {
    /// Standard normal (mean 0, sigma 1).
    pub fn standard() -> Self {
        Self {
            average: 0.0,
            sigma: 1.0,
        }
    }

    /// Normal with the given mean and standard deviation.
    pub fn new(average: Real, sigma: Real) -> Result<Self> {
        ql_core::ensure!(sigma > 0.0, "sigma must be greater than 0.0 ({sigma} not allowed)");
        Ok(Self { average, sigma })
    }

    /// Quantile at probability `p`.
    pub fn value(&self, p: Real) -> Result<Real> {
        ql_core::ensure!(p > 0.0 && p < 1.0, "probability ({p}) must be in (0, 1)");
        Ok(self.average + self.sigma * standard().inverse_cdf(p))
    }
}
