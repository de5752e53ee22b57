//! Black-Scholes generator in log-spot (translates `fdmblackscholesop.hpp`).

use super::{FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp};
use crate::finite_differences::{meshers::FdmMesherComposite, utilities::FdmQuantoHelper};
use nalgebra::DMatrix;
use ql_core::{errors::Result, Real, Size, Time};
use ql_processes::GeneralizedBlackScholesProcess;
use ql_termstructures::{BlackVolTermStructure, YieldTermStructure};
use std::sync::Arc;

/// `L = (r - q - σ²/2)·∂x + σ²/2·∂xx - r` along direction `direction` of the
/// mesher, with `x = ln S`.
///
/// Rates and variance are read as forwards over the step `[t1, t2]` and the
/// variance at the strike, so a smile only enters through that one point.
/// A quanto helper subtracts its drift adjustment.
///
/// Corresponds to `QuantLib::FdmBlackScholesOp` (without local volatility).
#[derive(Debug, Clone)]
pub struct FdmBlackScholesOp {
    mesher: Arc<FdmMesherComposite>,
    r_ts: Arc<dyn YieldTermStructure>,
    q_ts: Arc<dyn YieldTermStructure>,
    vol_ts: Arc<dyn BlackVolTermStructure>,
    strike: Real,
    direction: Size,
    dx_map: FirstDerivativeOp,
    dxx_map: SecondDerivativeOp,
    map_t: TripleBandLinearOp,
    quanto_helper: Option<Arc<FdmQuantoHelper>>,
}

impl FdmBlackScholesOp {
    /// Operator for `process` on `mesher`. Call
    /// [`set_time`](FdmLinearOpComposite::set_time) before applying it.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        direction: Size,
        quanto_helper: Option<Arc<FdmQuantoHelper>>,
    ) -> Self {
        let dx_map = FirstDerivativeOp::new(direction, &mesher);
        let dxx_map = SecondDerivativeOp::new(direction, &mesher);
        let map_t = TripleBandLinearOp::new(direction, &mesher);
        Self {
            r_ts: Arc::clone(process.risk_free_rate()),
            q_ts: Arc::clone(process.dividend_yield()),
            vol_ts: Arc::clone(process.black_volatility()),
            mesher,
            strike,
            direction,
            dx_map,
            dxx_map,
            map_t,
            quanto_helper,
        }
    }

    /// The mesher the operator lives on.
    pub fn mesher(&self) -> &Arc<FdmMesherComposite> {
        &self.mesher
    }

    /// The operator as last set by `set_time`.
    pub fn current(&self) -> &TripleBandLinearOp {
        &self.map_t
    }

    fn zeros(&self, r: &[Real]) -> Vec<Real> {
        vec![0.0; r.len()]
    }
}

impl FdmLinearOpComposite for FdmBlackScholesOp {
    fn size(&self) -> Size {
        1
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        let r = self.r_ts.forward_rate(t1, t2);
        let q = self.q_ts.forward_rate(t1, t2);
        let v = self.vol_ts.black_forward_variance(t1, t2, self.strike) / (t2 - t1);

        let quanto = self
            .quanto_helper
            .as_ref()
            .map_or(0.0, |h| h.quanto_adjustment(v.sqrt(), t1, t2));
        let drift = r - q - 0.5 * v - quanto;

        let n = self.mesher.layout().size();
        let diffusion = self.dxx_map.mult(&vec![0.5 * v; n]);
        self.map_t.axpyb(&[drift], &self.dx_map, &diffusion, &[-r]);
    }

    fn apply(&self, r: &[Real]) -> Vec<Real> {
        self.map_t.apply(r)
    }

    fn apply_mixed(&self, r: &[Real]) -> Vec<Real> {
        self.zeros(r)
    }

    fn apply_direction(&self, direction: Size, r: &[Real]) -> Vec<Real> {
        if direction == self.direction {
            self.map_t.apply(r)
        } else {
            self.zeros(r)
        }
    }

    fn solve_splitting(&self, direction: Size, r: &[Real], a: Real) -> Result<Vec<Real>> {
        if direction == self.direction {
            self.map_t.solve_splitting(r, a, 1.0)
        } else {
            Ok(r.to_vec())
        }
    }

    fn preconditioner(&self, r: &[Real], dt: Real) -> Result<Vec<Real>> {
        self.solve_splitting(self.direction, r, dt)
    }

    fn to_matrix_decomp(&self) -> Vec<DMatrix<Real>> {
        vec![self.map_t.to_matrix()]
    }
}
