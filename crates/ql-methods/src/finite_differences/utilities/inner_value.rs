//! Exercise values on the grid (translates `fdminnervaluecalculator.hpp` and
//! `fdmescrowedloginnervaluecalculator.hpp`).
//!
//! The terminal condition uses the cell average of the payoff rather than its
//! point value, which removes most of the oscillation caused by the kink at
//! the strike.

use super::EscrowedDividendAdjustment;
use crate::finite_differences::{meshers::FdmMesherComposite, operators::FdmLinearOpIterator};
use ql_core::{errors::Result, Real, Size, Time};
use ql_instruments::Payoff;
use ql_math::{Integrator, SimpsonIntegral};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

/// Exercise value of a grid point.
///
/// Corresponds to `QuantLib::FdmInnerValueCalculator`.
pub trait FdmInnerValueCalculator: fmt::Debug + Send + Sync {
    /// Value of exercising at `iter` at time `t`.
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;

    /// Average exercise value over the cell around `iter`.
    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;
}

/// Always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct FdmZeroInnerValue;

impl FdmInnerValueCalculator for FdmZeroInnerValue {
    fn inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> Real {
        0.0
    }

    fn avg_inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> Real {
        0.0
    }
}

// ── Cell averaging ───────────────────────────────────────────────────────────

type GridMapping = Arc<dyn Fn(Real) -> Real + Send + Sync>;

/// Cell averages along one direction, filled on first use.
#[derive(Debug, Default)]
struct AverageCache(Mutex<Option<Vec<Real>>>);

impl AverageCache {
    fn get_or_fill(
        &self,
        mesher: &FdmMesherComposite,
        direction: Size,
        iter: &FdmLinearOpIterator,
        mut calc: impl FnMut(&FdmLinearOpIterator) -> Real,
    ) -> Real {
        let mut cache = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let values = cache.get_or_insert_with(|| {
            let dim = mesher.layout().dim()[direction];
            let mut values = vec![Real::NAN; dim];
            let mut filled = vec![false; dim];
            for it in mesher.layout().iter() {
                let xn = it.coordinates[direction];
                if !filled[xn] {
                    filled[xn] = true;
                    values[xn] = calc(&it);
                }
            }
            values
        });
        values[iter.coordinates[direction]]
    }
}

/// Simpson average of `f` over `[a, b]` with the accuracy used for payoffs.
fn cell_average(f: impl Fn(Real) -> Real, a: Real, b: Real) -> Result<Real> {
    let (fa, fb) = (f(a), f(b));
    let accuracy = if fa != 0.0 || fb != 0.0 {
        (fa + fb) * 5e-5
    } else {
        1e-4
    };
    Ok(SimpsonIntegral::new(accuracy, 8).integrate(&f, a, b)? / (b - a))
}

/// Average of `f` over the cell around `iter`, or `point_value` at the grid
/// ends and whenever the quadrature does not converge.
fn averaged_or_point(
    mesher: &FdmMesherComposite,
    direction: Size,
    iter: &FdmLinearOpIterator,
    f: impl Fn(Real) -> Real,
    point_value: Real,
) -> Real {
    let dim = mesher.layout().dim()[direction];
    let coord = iter.coordinates[direction];
    if coord == 0 || coord == dim - 1 {
        return point_value;
    }
    let loc = mesher.location(iter, direction);
    let a = loc - 0.5 * mesher.dminus(iter, direction);
    let b = loc + 0.5 * mesher.dplus(iter, direction);
    match cell_average(f, a, b) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(
                coordinate = coord,
                error = %e,
                "cell averaging failed, using the point value"
            );
            point_value
        }
    }
}

/// Payoff of `mapping(x)`, cell-averaged along `direction`.
///
/// Corresponds to `QuantLib::FdmCellAveragingInnerValue`.
pub struct FdmCellAveragingInnerValue {
    payoff: Arc<dyn Payoff>,
    mesher: Arc<FdmMesherComposite>,
    direction: Size,
    mapping: GridMapping,
    cache: AverageCache,
}

impl FdmCellAveragingInnerValue {
    /// Inner value of `payoff(mapping(x))` where `x` is the grid location
    /// along `direction`.
    pub fn new(
        payoff: Arc<dyn Payoff>,
        mesher: Arc<FdmMesherComposite>,
        direction: Size,
        mapping: impl Fn(Real) -> Real + Send + Sync + 'static,
    ) -> Self {
        Self {
            payoff,
            mesher,
            direction,
            mapping: Arc::new(mapping),
            cache: AverageCache::default(),
        }
    }

    fn payoff_at(&self, x: Real) -> Real {
        self.payoff.value((self.mapping)(x))
    }
}

impl fmt::Debug for FdmCellAveragingInnerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmCellAveragingInnerValue")
            .field("payoff", &self.payoff)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl FdmInnerValueCalculator for FdmCellAveragingInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        self.payoff_at(self.mesher.location(iter, self.direction))
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        self.cache
            .get_or_fill(&self.mesher, self.direction, iter, |it| {
                averaged_or_point(
                    &self.mesher,
                    self.direction,
                    it,
                    |x| self.payoff_at(x),
                    self.inner_value(it, t),
                )
            })
    }
}

/// Payoff of `exp(x)`: the grid holds the log of the spot.
///
/// Corresponds to `QuantLib::FdmLogInnerValue`.
#[derive(Debug)]
pub struct FdmLogInnerValue(FdmCellAveragingInnerValue);

impl FdmLogInnerValue {
    /// Inner value of `payoff(exp(x))` along `direction`.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: Arc<FdmMesherComposite>, direction: Size) -> Self {
        Self(FdmCellAveragingInnerValue::new(
            payoff,
            mesher,
            direction,
            Real::exp,
        ))
    }
}

impl FdmInnerValueCalculator for FdmLogInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        self.0.inner_value(iter, t)
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        self.0.avg_inner_value(iter, t)
    }
}

/// Payoff of the full spot `exp(x) - dividend_adjustment(t)` on an
/// escrowed-dividend grid.
///
/// Corresponds to `QuantLib::FdmEscrowedLogInnerValueCalculator`.
#[derive(Debug)]
pub struct FdmEscrowedLogInnerValue {
    adjustment: Arc<EscrowedDividendAdjustment>,
    payoff: Arc<dyn Payoff>,
    mesher: Arc<FdmMesherComposite>,
    direction: Size,
    cache: AverageCache,
}

impl FdmEscrowedLogInnerValue {
    /// Inner value on the escrowed grid along `direction`.
    pub fn new(
        adjustment: Arc<EscrowedDividendAdjustment>,
        payoff: Arc<dyn Payoff>,
        mesher: Arc<FdmMesherComposite>,
        direction: Size,
    ) -> Self {
        Self {
            adjustment,
            payoff,
            mesher,
            direction,
            cache: AverageCache::default(),
        }
    }
}

impl FdmInnerValueCalculator for FdmEscrowedLogInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let s = self.mesher.location(iter, self.direction).exp()
            - self.adjustment.dividend_adjustment(t);
        self.payoff.value(s.max(0.0))
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let div_adj = self.adjustment.dividend_adjustment(t);
        self.cache
            .get_or_fill(&self.mesher, self.direction, iter, |it| {
                averaged_or_point(
                    &self.mesher,
                    self.direction,
                    it,
                    |x| self.payoff.value((x.exp() - div_adj).max(0.0)),
                    self.inner_value(it, t),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Uniform1dMesher;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{CashOrNothingPayoff, OptionType, PlainVanillaPayoff, StrikedPayoff};
    use ql_termstructures::FlatForward;

    fn mesher() -> Arc<FdmMesherComposite> {
        Arc::new(FdmMesherComposite::from_1d(
            Uniform1dMesher::new(50.0, 150.0, 11).unwrap(),
        ))
    }

    #[test]
    fn cell_average_smooths_the_kink() {
        let m = mesher();
        let calc = FdmCellAveragingInnerValue::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            Arc::clone(&m),
            0,
            |x| x,
        );
        let at_strike = m.layout().iter().nth(5).unwrap();
        assert_eq!(calc.inner_value(&at_strike, 1.0), 0.0);
        // average of max(s - 100, 0) over [95, 105]
        assert_abs_diff_eq!(calc.avg_inner_value(&at_strike, 1.0), 1.25, epsilon = 1e-3);

        let in_the_money = m.layout().iter().nth(8).unwrap();
        assert_abs_diff_eq!(calc.avg_inner_value(&in_the_money, 1.0), 30.0, epsilon = 1e-3);

        let edge = m.layout().iter().last().unwrap();
        assert_eq!(calc.avg_inner_value(&edge, 1.0), 50.0);
    }

    #[test]
    fn digital_cells_average_to_cash_or_fall_back_at_the_jump() {
        let m = mesher();
        let digital = Arc::new(CashOrNothingPayoff::new(OptionType::Call, 102.0, 10.0));
        assert_eq!(digital.strike(), 102.0);
        let calc = FdmCellAveragingInnerValue::new(digital.into_payoff(), Arc::clone(&m), 0, |x| x);

        let nodes: Vec<_> = m.layout().iter().collect();
        assert_eq!(calc.avg_inner_value(&nodes[3], 1.0), 0.0);
        assert_abs_diff_eq!(calc.avg_inner_value(&nodes[8], 1.0), 10.0, epsilon = 1e-12);
        // Simpson cannot resolve the jump inside [95, 105]
        assert_eq!(calc.inner_value(&nodes[5], 1.0), 0.0);
        assert_eq!(calc.avg_inner_value(&nodes[5], 1.0), 0.0);
        assert_abs_diff_eq!(calc.avg_inner_value(&nodes[6], 1.0), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn log_inner_value_maps_through_exp() {
        let m = Arc::new(FdmMesherComposite::from_1d(
            Uniform1dMesher::new(90f64.ln(), 110f64.ln(), 5).unwrap(),
        ));
        let calc = FdmLogInnerValue::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
            m.clone(),
            0,
        );
        let first = m.layout().iter().next().unwrap();
        assert_abs_diff_eq!(calc.inner_value(&first, 0.0), 10.0, epsilon = 1e-10);
        assert_eq!(FdmZeroInnerValue.avg_inner_value(&first, 0.0), 0.0);
    }

    #[test]
    fn escrowed_value_adds_back_dividends() {
        let m = Arc::new(FdmMesherComposite::from_1d(
            Uniform1dMesher::new(90f64.ln(), 110f64.ln(), 5).unwrap(),
        ));
        let adj = Arc::new(EscrowedDividendAdjustment::new(
            vec![ql_instruments::Dividend::new(0.5, 5.0)],
            Arc::new(FlatForward::new(0.0)),
            Arc::new(FlatForward::new(0.0)),
            1.0,
        ));
        let calc = FdmEscrowedLogInnerValue::new(
            adj,
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            m.clone(),
            0,
        );
        let last = m.layout().iter().last().unwrap();
        assert_abs_diff_eq!(calc.inner_value(&last, 0.0), 15.0, epsilon = 1e-10);
        assert_abs_diff_eq!(calc.inner_value(&last, 0.75), 10.0, epsilon = 1e-10);
    }
}
