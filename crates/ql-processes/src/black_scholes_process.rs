//! Generalized Black-Scholes process
//! (translates `ql/processes/blackscholesprocess.hpp`).
//!
//! `dS/S = (r(t) − q(t)) dt + σ(t, S) dW`
//!
//! Only the market-data side of the process is modelled: the
//! finite-difference engine reads discount factors, forward rates and Black
//! variances from it and never simulates paths.
//!
//! Concrete variants:
//! * `GeneralizedBlackScholesProcess`: the most general form
//! * `black_scholes_process`: no dividends
//! * `black_scholes_merton_process`: continuous dividend yield

use ql_core::{Rate, Real, Time, Volatility};
use ql_termstructures::{BlackConstantVol, BlackVolTermStructure, FlatForward, YieldTermStructure};
use std::sync::Arc;

/// A generalized Black-Scholes stochastic process.
///
/// Corresponds to `QuantLib::GeneralizedBlackScholesProcess`.
#[derive(Debug, Clone)]
pub struct GeneralizedBlackScholesProcess {
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
}

impl GeneralizedBlackScholesProcess {
    /// Create a new GBS process with a Black volatility surface.
    pub fn new(
        x0: Real,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        black_vol: Arc<dyn BlackVolTermStructure>,
    ) -> Self {
        Self {
            x0,
            risk_free_rate,
            dividend_yield,
            black_vol,
        }
    }

    /// Flat continuously-compounded rates and a constant volatility.
    pub fn flat(x0: Real, r: Rate, q: Rate, vol: Volatility) -> Self {
        Self::new(
            x0,
            Arc::new(FlatForward::new(r)),
            Arc::new(FlatForward::new(q)),
            Arc::new(BlackConstantVol::new(vol)),
        )
    }

    /// The spot price.
    pub fn x0(&self) -> Real {
        self.x0
    }

    /// The risk-free rate term structure.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// The dividend yield term structure.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }

    /// The Black volatility surface.
    pub fn black_volatility(&self) -> &Arc<dyn BlackVolTermStructure> {
        &self.black_vol
    }

    /// Forward price of the underlying for delivery at `t`.
    pub fn forward(&self, t: Time) -> Real {
        self.x0 * self.dividend_yield.discount(t) / self.risk_free_rate.discount(t)
    }
}

/// A Black-Scholes process with no dividends (`q = 0`).
///
/// Corresponds to `QuantLib::BlackScholesProcess`.
pub fn black_scholes_process(
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
) -> GeneralizedBlackScholesProcess {
    let zero_yield: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.0));
    GeneralizedBlackScholesProcess::new(x0, risk_free_rate, zero_yield, black_vol)
}

/// A Black-Scholes-Merton process with continuous dividend yield.
///
/// Corresponds to `QuantLib::BlackScholesMertonProcess`.
pub fn black_scholes_merton_process(
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
) -> GeneralizedBlackScholesProcess {
    GeneralizedBlackScholesProcess::new(x0, risk_free_rate, dividend_yield, black_vol)
}
