//! Escrowed cash-dividend model (translates `escroweddividendadjustment.hpp`).

use ql_core::{Real, Time};
use ql_instruments::Dividend;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Present value at `t` of the dividends still to be paid, carried with the
/// risk-free and dividend curves.
///
/// The adjustment is negative: the escrowed spot is `S + dividend_adjustment(0)`
/// and a grid value `x` maps back to the full spot `exp(x) - dividend_adjustment(t)`.
///
/// Corresponds to `QuantLib::EscrowedDividendAdjustment`.
#[derive(Debug, Clone)]
pub struct EscrowedDividendAdjustment {
    dividends: Vec<Dividend>,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    maturity: Time,
}

impl EscrowedDividendAdjustment {
    /// Create the adjustment for a dividend schedule up to `maturity`.
    pub fn new(
        dividends: Vec<Dividend>,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        maturity: Time,
    ) -> Self {
        Self {
            dividends,
            risk_free_rate,
            dividend_yield,
            maturity,
        }
    }

    /// `-Σ D·rDisc(t_d)/rDisc(t)·qDisc(t)/qDisc(t_d)` over dividends with
    /// `t_d >= t`; zero past maturity.
    pub fn dividend_adjustment(&self, t: Time) -> Real {
        if t > self.maturity {
            return 0.0;
        }
        let r = &self.risk_free_rate;
        let q = &self.dividend_yield;
        -self
            .dividends
            .iter()
            .filter(|d| d.time >= t)
            .map(|d| {
                d.amount * r.discount(d.time) / r.discount(t) * q.discount(t) / q.discount(d.time)
            })
            .sum::<Real>()
    }

    /// The dividend schedule.
    pub fn dividends(&self) -> &[Dividend] {
        &self.dividends
    }

    /// The risk-free curve.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// The dividend-yield curve.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }
}
