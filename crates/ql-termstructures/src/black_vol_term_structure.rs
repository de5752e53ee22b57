//! `BlackVolTermStructure`: Black-volatility term structures
//! (translates `ql/termstructures/volatility/equityfx/blackvoltermstructure.hpp`).
//!
//! Provides the `BlackVolTermStructure` trait and concrete implementations:
//! * `BlackConstantVol`: a flat Black volatility surface.

use ql_core::{Real, Time, Volatility};

/// Interval used when a forward volatility is asked for a zero-length period.
const FORWARD_EPSILON: Time = 1.0e-5;

/// A Black-volatility term structure.
///
/// Implementors must provide **exactly one** of:
/// * [`black_vol_impl`](BlackVolTermStructure::black_vol_impl): σ(t, k)
/// * [`black_variance_impl`](BlackVolTermStructure::black_variance_impl): σ²·t
///
/// The other is derived automatically. Variances must be non-decreasing in
/// `t` for a fixed strike.
///
/// Corresponds to `QuantLib::BlackVolTermStructure`.
pub trait BlackVolTermStructure: std::fmt::Debug + Send + Sync {
    /// Return the Black volatility for time `t` and strike `strike`.
    fn black_vol_impl(&self, t: Time, strike: Real) -> Volatility {
        if t <= 0.0 {
            return 0.0;
        }
        (self.black_variance_impl(t, strike) / t).sqrt()
    }

    /// Return the Black variance `σ²·t` for time `t` and strike `strike`.
    fn black_variance_impl(&self, t: Time, strike: Real) -> Real {
        let vol = self.black_vol_impl(t, strike);
        vol * vol * t
    }

    /// Black volatility for a time and strike.
    fn black_vol(&self, t: Time, strike: Real) -> Volatility {
        self.black_vol_impl(t, strike)
    }

    /// Black variance for a time and strike.
    fn black_variance(&self, t: Time, strike: Real) -> Real {
        self.black_variance_impl(t, strike)
    }

    /// Forward variance `σ²(t2)·t2 - σ²(t1)·t1` for `t1 <= t2`.
    fn black_forward_variance(&self, t1: Time, t2: Time, strike: Real) -> Real {
        debug_assert!(t2 >= t1, "t2 ({t2}) must not precede t1 ({t1})");
        (self.black_variance_impl(t2, strike) - self.black_variance_impl(t1, strike)).max(0.0)
    }

    /// Forward volatility on `[t1, t2]`; a zero-length period is widened
    /// to `1e-5` years.
    fn black_forward_vol(&self, t1: Time, t2: Time, strike: Real) -> Volatility {
        let t2 = if t2 == t1 { t1 + FORWARD_EPSILON } else { t2 };
        (self.black_forward_variance(t1, t2, strike) / (t2 - t1)).sqrt()
    }
}

// ── BlackConstantVol ──────────────────────────────────────────────────────────

/// A flat (constant) Black volatility surface.
///
/// `σ(t, K) = constant` for all `t > 0` and all strikes `K`.
///
/// Corresponds to `QuantLib::BlackConstantVol`.
#[derive(Debug, Clone, Copy)]
pub struct BlackConstantVol {
    volatility: Volatility,
}

impl BlackConstantVol {
    /// Create a constant Black vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }

    /// The constant volatility value.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl BlackVolTermStructure for BlackConstantVol {
    fn black_vol_impl(&self, _t: Time, _strike: Real) -> Volatility {
        self.volatility
    }

    fn black_variance_impl(&self, t: Time, _strike: Real) -> Real {
        self.volatility * self.volatility * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_vol_value() {
        let surface = BlackConstantVol::new(0.20);
        assert_abs_diff_eq!(surface.black_vol(1.0, 100.0), 0.20, epsilon = 1e-15);
        assert_abs_diff_eq!(surface.black_vol(5.0, 50.0), 0.20, epsilon = 1e-15);
    }

    #[test]
    fn constant_vol_variance() {
        let surface = BlackConstantVol::new(0.20);
        assert_abs_diff_eq!(surface.black_variance(2.0, 100.0), 0.08, epsilon = 1e-15);
        assert_abs_diff_eq!(
            surface.black_forward_variance(0.5, 1.5, 100.0),
            0.04,
            epsilon = 1e-15
        );
    }

    #[test]
    fn forward_vol_of_flat_surface_is_flat() {
        let surface = BlackConstantVol::new(0.3);
        assert_abs_diff_eq!(surface.black_forward_vol(1.0, 2.0, 90.0), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(surface.black_forward_vol(1.0, 1.0, 90.0), 0.3, epsilon = 1e-9);
    }

    /// A surface with a term structure, defined through the variance hook.
    #[derive(Debug)]
    struct Increasing;

    impl BlackVolTermStructure for Increasing {
        fn black_variance_impl(&self, t: Time, _strike: Real) -> Real {
            0.04 * t + 0.01 * t * t
        }
    }

    #[test]
    fn vol_derived_from_variance() {
        // σ²(2) = (0.08 + 0.04) / 2
        assert_abs_diff_eq!(Increasing.black_vol(2.0, 1.0), 0.06_f64.sqrt(), epsilon = 1e-14);
        assert_eq!(Increasing.black_vol(0.0, 1.0), 0.0);
        assert_abs_diff_eq!(
            Increasing.black_forward_variance(1.0, 2.0, 1.0),
            0.12 - 0.05,
            epsilon = 1e-14
        );
    }
}
