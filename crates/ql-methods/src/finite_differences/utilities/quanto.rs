//! Quanto drift adjustment (translates `fdmquantohelper.hpp`).

use ql_core::{DiscountFactor, Rate, Real, Time, Volatility};
use ql_termstructures::{BlackVolTermStructure, YieldTermStructure};
use std::sync::Arc;

/// Market data needed to price an equity option paid in a foreign currency.
///
/// Corresponds to `QuantLib::FdmQuantoHelper`.
#[derive(Debug, Clone)]
pub struct FdmQuantoHelper {
    domestic_rate: Arc<dyn YieldTermStructure>,
    foreign_rate: Arc<dyn YieldTermStructure>,
    fx_volatility: Arc<dyn BlackVolTermStructure>,
    equity_fx_correlation: Real,
    exchange_rate_atm_level: Real,
}

impl FdmQuantoHelper {
    /// Bundle the domestic and foreign curves, the FX vol surface, the
    /// equity/FX correlation and the ATM exchange rate level used to read
    /// the FX vol.
    pub fn new(
        domestic_rate: Arc<dyn YieldTermStructure>,
        foreign_rate: Arc<dyn YieldTermStructure>,
        fx_volatility: Arc<dyn BlackVolTermStructure>,
        equity_fx_correlation: Real,
        exchange_rate_atm_level: Real,
    ) -> Self {
        Self {
            domestic_rate,
            foreign_rate,
            fx_volatility,
            equity_fx_correlation,
            exchange_rate_atm_level,
        }
    }

    /// Drift correction on `[t1, t2]` for an equity with volatility
    /// `equity_vol`: `r_dom - r_for + σ_eq·σ_fx·ρ`.
    pub fn quanto_adjustment(&self, equity_vol: Volatility, t1: Time, t2: Time) -> Rate {
        let r_domestic = self.domestic_rate.forward_rate(t1, t2);
        let r_foreign = self.foreign_rate.forward_rate(t1, t2);
        let fx_vol = self
            .fx_volatility
            .black_forward_vol(t1, t2, self.exchange_rate_atm_level);
        r_domestic - r_foreign + equity_vol * fx_vol * self.equity_fx_correlation
    }

    /// Dividend discount factor of the quanto-adjusted dividend curve:
    /// `qDisc(t)·rDisc(t)/fDisc(t)·exp(-ρ·σ_eq(t, K)·σ_fx(t)·t)`.
    pub fn adjusted_dividend_discount(
        &self,
        dividend_yield: &dyn YieldTermStructure,
        risk_free_rate: &dyn YieldTermStructure,
        equity_vol: &dyn BlackVolTermStructure,
        strike: Real,
        t: Time,
    ) -> DiscountFactor {
        let vol_term = self.equity_fx_correlation
            * equity_vol.black_vol(t, strike)
            * self.fx_volatility.black_vol(t, self.exchange_rate_atm_level);
        dividend_yield.discount(t) * risk_free_rate.discount(t) / self.foreign_rate.discount(t)
            * (-vol_term * t).exp()
    }

    /// The domestic risk-free curve.
    pub fn domestic_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.domestic_rate
    }

    /// The foreign risk-free curve.
    pub fn foreign_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.foreign_rate
    }

    /// The FX volatility surface.
    pub fn fx_volatility(&self) -> &Arc<dyn BlackVolTermStructure> {
        &self.fx_volatility
    }

    /// Correlation between the equity and the exchange rate.
    pub fn equity_fx_correlation(&self) -> Real {
        self.equity_fx_correlation
    }

    /// Exchange-rate level at which the FX vol is read.
    pub fn exchange_rate_atm_level(&self) -> Real {
        self.exchange_rate_atm_level
    }
}
