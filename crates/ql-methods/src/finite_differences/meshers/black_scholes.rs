//! Log-spot grid for Black-Scholes problems
//! (translates `fdmblackscholesmesher.hpp`).

use super::{Concentrating1dMesher, Fdm1dMesher, Uniform1dMesher};
use crate::finite_differences::utilities::FdmQuantoHelper;
use ql_core::{errors::Result, Rate, Real, Size, Time, Volatility};
use ql_instruments::Dividend;
use ql_math::InverseCumulativeNormal;
use ql_processes::GeneralizedBlackScholesProcess;
use ql_termstructures::{BlackConstantVol, FlatForward};
use std::{ops::Deref, sync::Arc};

/// Grid in `x = ln(S)` wide enough to hold the spot distribution up to
/// maturity.
///
/// The forward is walked across the dividend dates and a set of evenly
/// spaced times, recording its lowest and highest value; the grid then
/// extends `σ√T·Φ⁻¹(1-eps)·scale_factor` beyond the log of those extremes.
///
/// Corresponds to `QuantLib::FdmBlackScholesMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmBlackScholesMesher(Fdm1dMesher);

impl FdmBlackScholesMesher {
    /// Build the mesher.
    ///
    /// * `x_min_constraint` / `x_max_constraint` override the computed bounds
    /// * `eps` is the probability mass left outside the grid (QuantLib uses 1e-4)
    /// * `scale_factor` widens the bounds further (QuantLib uses 1.5)
    /// * `c_point = (S, density)` concentrates nodes around `ln(S)`
    /// * `spot_adjustment` is added to the spot before walking the forward
    ///
    /// # Errors
    /// `Precondition` for a non-positive spot, and any error raised while
    /// building the underlying 1-D mesher.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        size: Size,
        process: &GeneralizedBlackScholesProcess,
        maturity: Time,
        strike: Real,
        x_min_constraint: Option<Real>,
        x_max_constraint: Option<Real>,
        eps: Real,
        scale_factor: Real,
        c_point: Option<(Real, Real)>,
        dividends: &[Dividend],
        quanto_helper: Option<&FdmQuantoHelper>,
        spot_adjustment: Real,
    ) -> Result<Self> {
        let s0 = process.x0();
        ql_core::ensure!(s0 > 0.0, "negative or null underlying given ({s0})");

        let mut steps: Vec<(Time, Real)> = dividends
            .iter()
            .filter(|d| (0.0..=maturity).contains(&d.time))
            .map(|d| (d.time, d.amount))
            .collect();
        let intermediate = Size::max(2, (24.0 * maturity) as Size);
        steps.extend(
            (0..intermediate).map(|i| ((i + 1) as Real * (maturity / intermediate as Real), 0.0)),
        );
        steps.sort_by(|a, b| a.0.total_cmp(&b.0));

        let r_ts = process.risk_free_rate();
        let q_ts = process.dividend_yield();
        let vol_ts = process.black_volatility();
        let q_discount = |t: Time| match quanto_helper {
            Some(h) => h.adjusted_dividend_discount(
                q_ts.as_ref(),
                r_ts.as_ref(),
                vol_ts.as_ref(),
                strike,
                t,
            ),
            None => q_ts.discount(t),
        };

        let mut last_time = 0.0;
        let mut fwd = s0 + spot_adjustment;
        let (mut lo, mut hi) = (fwd, fwd);
        for &(t, amount) in &steps {
            fwd = fwd / r_ts.discount(t) * r_ts.discount(last_time) * q_discount(t)
                / q_discount(last_time);
            lo = lo.min(fwd);
            hi = hi.max(fwd);

            fwd -= amount;
            lo = lo.min(fwd);
            hi = hi.max(fwd);

            last_time = t;
        }
        ql_core::ensure!(lo > 0.0, "spot minus dividends becomes negative");

        let norm_inv_eps = InverseCumulativeNormal::standard().value(1.0 - eps)?;
        let sigma_sqrt_t = vol_ts.black_vol(maturity, strike) * maturity.sqrt();
        let width = sigma_sqrt_t * norm_inv_eps * scale_factor;

        let x_min = x_min_constraint.unwrap_or(lo.ln() - width);
        let x_max = x_max_constraint.unwrap_or(hi.ln() + width);

        let helper: Fdm1dMesher = match c_point {
            Some((point, density)) if (x_min..=x_max).contains(&point.ln()) => {
                Concentrating1dMesher::new(x_min, x_max, size, Some((point.ln(), density)), false)?
                    .into()
            }
            _ => Uniform1dMesher::new(x_min, x_max, size)?.into(),
        };
        Ok(Self(helper))
    }

    /// Mesher with QuantLib's defaults: no constraints, `eps = 1e-4`,
    /// `scale_factor = 1.5`, concentration at the strike with density 0.1,
    /// no dividends and no quanto adjustment.
    pub fn with_defaults(
        size: Size,
        process: &GeneralizedBlackScholesProcess,
        maturity: Time,
        strike: Real,
    ) -> Result<Self> {
        Self::new(
            size,
            process,
            maturity,
            strike,
            None,
            None,
            1e-4,
            1.5,
            Some((strike, 0.1)),
            &[],
            None,
            0.0,
        )
    }

    /// A process with flat rates and a constant volatility.
    pub fn process_helper(
        spot: Real,
        risk_free_rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
    ) -> GeneralizedBlackScholesProcess {
        GeneralizedBlackScholesProcess::new(
            spot,
            Arc::new(FlatForward::new(risk_free_rate)),
            Arc::new(FlatForward::new(dividend_yield)),
            Arc::new(BlackConstantVol::new(vol)),
        )
    }
}

impl Deref for FdmBlackScholesMesher {
    type Target = Fdm1dMesher;

    fn deref(&self) -> &Fdm1dMesher {
        &self.0
    }
}

impl From<FdmBlackScholesMesher> for Fdm1dMesher {
    fn from(m: FdmBlackScholesMesher) -> Self {
        m.0
    }
}
