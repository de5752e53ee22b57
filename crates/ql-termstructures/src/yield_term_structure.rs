//! `YieldTermStructure`: yield / interest-rate term structures
//! (translates `ql/termstructures/yieldtermstructure.hpp`).
//!
//! Curves are addressed by year fraction `t` measured from the valuation
//! time. The three fundamental quantities are:
//!
//! * **discount factor**: `P(0,t)`
//! * **zero rate**: the continuously-compounded zero rate for maturity *t*
//! * **forward rate**: the continuously-compounded forward rate between two
//!   times (or the instantaneous forward when both coincide)

use ql_core::{DiscountFactor, Rate, Real, Time};

/// Small time step used for instantaneous forward rate computations.
const DT: Real = 1.0e-4;

/// A yield (interest-rate) term structure.
///
/// Implementors must provide **exactly one** of the two low-level methods:
///
/// * [`discount_impl`](YieldTermStructure::discount_impl)
/// * [`zero_rate_impl`](YieldTermStructure::zero_rate_impl)
///
/// The other is derived through `P(t) = exp(-z(t)·t)`.
///
/// Corresponds to `QuantLib::YieldTermStructure`.
pub trait YieldTermStructure: std::fmt::Debug + Send + Sync {
    // ── Low-level impl hooks (override exactly one) ──────────────────────

    /// Return the discount factor for a given time `t`.
    ///
    /// Default: computed from `zero_rate_impl`.
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        (-self.zero_rate_impl(t) * t).exp()
    }

    /// Return the continuously-compounded zero rate for time `t`.
    ///
    /// Default: computed from `discount_impl`; at `t = 0` the short end is
    /// approximated over `[0, DT]`.
    fn zero_rate_impl(&self, t: Time) -> Rate {
        let t = if t == 0.0 { DT } else { t };
        -self.discount_impl(t).ln() / t
    }

    // ── Public interface ─────────────────────────────────────────────────

    /// Discount factor for a time.
    fn discount(&self, t: Time) -> DiscountFactor {
        self.discount_impl(t)
    }

    /// Continuously-compounded zero rate for time `t`.
    fn zero_rate(&self, t: Time) -> Rate {
        self.zero_rate_impl(t)
    }

    /// Continuously-compounded forward rate on `[t1, t2]`.
    ///
    /// When `t1 == t2` the instantaneous forward at `t1` is returned,
    /// estimated over a step of `1e-4` years.
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        let (t1, t2) = if t2 == t1 {
            let lo = (t1 - 0.5 * DT).max(0.0);
            (lo, lo + DT)
        } else {
            (t1, t2)
        };
        (self.discount_impl(t1) / self.discount_impl(t2)).ln() / (t2 - t1)
    }
}
