//! Discrete cash dividends as jumps in the spot
//! (translates `fdmdividendhandler.hpp`).

use crate::finite_differences::meshers::FdmMesherComposite;
use ql_core::{errors::Result, Real, Size, Time};
use ql_instruments::Dividend;
use ql_math::{Interpolation1D, LinearInterpolation};
use std::sync::Arc;

const DIVIDEND_TOLERANCE: Time = 1e-12;

/// Shifts the solution across a cash dividend.
///
/// The rollback hands in values valid just after the payment. Since the
/// spot drops by `D` at the payment, the value just before it is
/// `V(S) = V_after(S - D)`, read off each grid line along the equity
/// direction by linear interpolation (floored at the lowest node).
///
/// Corresponds to `QuantLib::FdmDividendHandler`.
#[derive(Debug, Clone)]
pub struct FdmDividendHandler {
    dividend_times: Vec<Time>,
    dividends: Vec<Real>,
    mesher: Arc<FdmMesherComposite>,
    equity_direction: Size,
    x: Vec<Real>,
}

impl FdmDividendHandler {
    /// Handler for dividends `amounts[i]` paid at `times[i]` on a log-spot
    /// grid whose equity axis is `equity_direction`.
    ///
    /// # Errors
    /// `Precondition` on mismatched counts or an unknown direction.
    pub fn new(
        times: Vec<Time>,
        amounts: Vec<Real>,
        mesher: Arc<FdmMesherComposite>,
        equity_direction: Size,
    ) -> Result<Self> {
        ql_core::ensure!(
            times.len() == amounts.len(),
            "incorrect dimensions: {} dividend times but {} amounts",
            times.len(),
            amounts.len()
        );
        ql_core::ensure!(
            equity_direction < mesher.dimensions(),
            "equity direction {equity_direction} out of range"
        );

        let x = mesher.meshers()[equity_direction]
            .locations()
            .iter()
            .map(|l| l.exp())
            .collect();
        Ok(Self {
            dividend_times: times,
            dividends: amounts,
            mesher,
            equity_direction,
            x,
        })
    }

    /// Handler for a dividend schedule.
    pub fn from_dividends(
        dividends: &[Dividend],
        mesher: Arc<FdmMesherComposite>,
        equity_direction: Size,
    ) -> Result<Self> {
        let (times, amounts) = dividends.iter().map(|d| (d.time, d.amount)).unzip();
        Self::new(times, amounts, mesher, equity_direction)
    }

    /// Payment times, which are stopping times of the rollback.
    pub fn dividend_times(&self) -> &[Time] {
        &self.dividend_times
    }

    /// Cash amounts.
    pub fn dividends(&self) -> &[Real] {
        &self.dividends
    }

    /// Spot values along the equity axis.
    pub fn spots(&self) -> &[Real] {
        &self.x
    }

    /// Shift `a` across the dividend paid at `t`, if any.
    ///
    /// # Errors
    /// Propagates interpolation failures, which only occur on degenerate
    /// grids.
    pub fn apply_to(&self, a: &mut [Real], t: Time) -> Result<()> {
        let Some(d) = self
            .dividend_times
            .iter()
            .position(|&td| (td - t).abs() < DIVIDEND_TOLERANCE)
        else {
            return Ok(());
        };
        let dividend = self.dividends[d];

        if self.mesher.dimensions() == 1 {
            let interp = LinearInterpolation::new(&self.x, a)?;
            let shifted = self.shifted(&interp, dividend);
            a.copy_from_slice(&shifted);
            return Ok(());
        }

        let layout = self.mesher.layout();
        let stride = layout.spacing()[self.equity_direction];
        let mut line = vec![0.0; self.x.len()];
        // every line along the equity axis starts where that coordinate is 0
        for start in layout
            .iter()
            .filter(|it| it.coordinates[self.equity_direction] == 0)
            .map(|it| it.index)
        {
            for (k, v) in line.iter_mut().enumerate() {
                *v = a[start + k * stride];
            }
            let interp = LinearInterpolation::new(&self.x, &line)?;
            for (k, v) in self.shifted(&interp, dividend).into_iter().enumerate() {
                a[start + k * stride] = v;
            }
        }
        Ok(())
    }

    fn shifted(&self, interp: &LinearInterpolation, dividend: Real) -> Vec<Real> {
        let floor = self.x[0];
        self.x
            .iter()
            .map(|&s| interp.operator(floor.max(s - dividend)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, Uniform1dMesher};
    use approx::assert_abs_diff_eq;

    fn log_mesher(n: usize) -> Fdm1dMesher {
        Uniform1dMesher::new(50f64.ln(), 150f64.ln(), n).unwrap().into()
    }

    #[test]
    fn linear_values_shift_by_the_dividend() {
        let mesher = Arc::new(FdmMesherComposite::from_1d(log_mesher(41)));
        let handler = FdmDividendHandler::new(vec![0.5], vec![2.0], mesher, 0).unwrap();

        let mut a: Vec<Real> = handler.spots().iter().map(|s| s - 40.0).collect();
        let before = a.clone();
        handler.apply_to(&mut a, 0.25).unwrap();
        assert_eq!(a, before);

        handler.apply_to(&mut a, 0.5).unwrap();
        let x = handler.spots();
        for k in 0..x.len() {
            let expected = (x[k] - 2.0).max(x[0]) - 40.0;
            assert_abs_diff_eq!(a[k], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn every_line_of_a_two_dimensional_grid_is_shifted() {
        let mesher = Arc::new(
            FdmMesherComposite::new(vec![
                Uniform1dMesher::new(0.0, 1.0, 3).unwrap().into(),
                log_mesher(21),
            ])
            .unwrap(),
        );
        let handler =
            FdmDividendHandler::from_dividends(&[Dividend::new(0.1, 5.0)], Arc::clone(&mesher), 1)
                .unwrap();

        let x = handler.spots().to_vec();
        let mut a = vec![0.0; 63];
        for it in mesher.layout().iter() {
            let (j, k) = (it.coordinates[0], it.coordinates[1]);
            a[it.index] = (j + 1) as Real * x[k];
        }
        handler.apply_to(&mut a, 0.1).unwrap();
        for it in mesher.layout().iter() {
            let (j, k) = (it.coordinates[0], it.coordinates[1]);
            let expected = (j + 1) as Real * (x[k] - 5.0).max(x[0]);
            assert_abs_diff_eq!(a[it.index], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn mismatched_schedule_is_rejected() {
        let mesher = Arc::new(FdmMesherComposite::from_1d(log_mesher(11)));
        assert!(FdmDividendHandler::new(vec![0.1, 0.2], vec![1.0], mesher, 0).is_err());
    }
}
