//! Finite-difference Black-Scholes engine for vanilla options.
//!
//! Translates `ql/pricingengines/vanilla/fdblackscholesvanillaengine.hpp`.
//!
//! Builds a log-spot grid concentrated around the strike, rolls the payoff
//! back with the configured scheme while applying dividends and early
//! exercise, and reads value, delta, gamma and theta off the spline through
//! the final solution.

use ql_core::{errors::Result, Real, Size, Time};
use ql_instruments::{
    Dividend, ExerciseType, Payoff, PricingEngine, PricingResults, StrikedPayoff,
    VanillaOptionArguments,
};
use ql_methods::{
    EscrowedDividendAdjustment, FdmBlackScholesMesher, FdmBlackScholesSolver,
    FdmBoundaryConditionSet, FdmEscrowedLogInnerValue, FdmInnerValueCalculator, FdmLogInnerValue,
    FdmMesherComposite, FdmQuantoHelper, FdmSchemeDesc, FdmSolverDesc, FdmStepConditionComposite,
};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::debug;

/// How discrete cash dividends enter the model.
///
/// Corresponds to `QuantLib::FdBlackScholesVanillaEngine::CashDividendModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CashDividendModel {
    /// The spot drops by the dividend on its payment time.
    #[default]
    Spot,
    /// The present value of the dividends is removed from the spot up
    /// front and the payoff is evaluated on the escrowed spot.
    Escrowed,
}

/// Grid and scheme settings of [`FdBlackScholesVanillaEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdBlackScholesVanillaSettings {
    /// Number of time steps.
    pub t_grid: Size,
    /// Number of spot grid points.
    pub x_grid: Size,
    /// Implicit Euler steps taken before the main scheme.
    pub damping_steps: Size,
    /// Time-stepping scheme.
    pub scheme_desc: FdmSchemeDesc,
    /// Treatment of cash dividends.
    pub cash_dividend_model: CashDividendModel,
}

impl Default for FdBlackScholesVanillaSettings {
    fn default() -> Self {
        Self {
            t_grid: 100,
            x_grid: 100,
            damping_steps: 0,
            scheme_desc: FdmSchemeDesc::douglas(),
            cash_dividend_model: CashDividendModel::Spot,
        }
    }
}

/// Finite-difference engine for European, American and Bermudan vanilla
/// options under a generalized Black-Scholes process, with optional cash
/// dividends and quanto adjustment.
///
/// Corresponds to `QuantLib::FdBlackScholesVanillaEngine` (without local
/// volatility).
///
/// # Example
///
/// ```
/// use ql_instruments::{Exercise, OptionType, VanillaOption};
/// use ql_pricingengines::MakeFdBlackScholesVanillaEngine;
/// use ql_processes::GeneralizedBlackScholesProcess;
/// use std::sync::Arc;
///
/// let process = Arc::new(GeneralizedBlackScholesProcess::flat(100.0, 0.05, 0.0, 0.2));
/// let engine = MakeFdBlackScholesVanillaEngine::new(process)
///     .with_t_grid(50)
///     .with_x_grid(100)
///     .build();
/// let option = VanillaOption::plain(
///     OptionType::Put,
///     100.0,
///     Exercise::american(0.0, 1.0).unwrap(),
/// );
/// let npv = option.price(&engine).unwrap().npv;
/// assert!(npv > 5.57);
/// ```
#[derive(Debug, Clone)]
pub struct FdBlackScholesVanillaEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    dividends: Vec<Dividend>,
    quanto_helper: Option<Arc<FdmQuantoHelper>>,
    settings: FdBlackScholesVanillaSettings,
}

impl FdBlackScholesVanillaEngine {
    /// Engine with the default settings and no dividends.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self::with_settings(process, Vec::new(), None, FdBlackScholesVanillaSettings::default())
    }

    /// Engine with explicit dividends, quanto helper and settings.
    pub fn with_settings(
        process: Arc<GeneralizedBlackScholesProcess>,
        dividends: Vec<Dividend>,
        quanto_helper: Option<Arc<FdmQuantoHelper>>,
        settings: FdBlackScholesVanillaSettings,
    ) -> Self {
        Self {
            process,
            dividends,
            quanto_helper,
            settings,
        }
    }

    /// The grid and scheme settings.
    pub fn settings(&self) -> &FdBlackScholesVanillaSettings {
        &self.settings
    }

    /// The cash dividends.
    pub fn dividends(&self) -> &[Dividend] {
        &self.dividends
    }

    /// Value of a trade whose exercise is certain or whose underlying does
    /// not diffuse: intrinsic value at expiry, or the discounted intrinsic
    /// value of the forward.
    fn degenerate_value(&self, payoff: &dyn StrikedPayoff, maturity: Time, early: bool) -> Real {
        let spot = self.process.x0();
        if maturity <= 0.0 {
            return payoff.value(spot);
        }
        let r = self.process.risk_free_rate();
        let q = self.process.dividend_yield();
        let pv_dividends: Real = self
            .dividends
            .iter()
            .filter(|d| d.time >= 0.0 && d.time <= maturity)
            .map(|d| d.amount * r.discount(d.time))
            .sum();
        let forward = (spot - pv_dividends) * q.discount(maturity) / r.discount(maturity);
        let european = r.discount(maturity) * payoff.value(forward);
        if early {
            european.max(payoff.value(spot))
        } else {
            european
        }
    }
}

impl PricingEngine<VanillaOptionArguments> for FdBlackScholesVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let settings = &self.settings;
        let payoff = &args.payoff;
        let strike = payoff.strike();
        let maturity = args.exercise.last_time();
        let early = args.exercise.exercise_type() != ExerciseType::European;

        ql_core::ensure!(settings.t_grid > 0, "at least one time step is required");
        ql_core::ensure!(
            settings.x_grid >= 4,
            "at least four spot grid points are required, got {}",
            settings.x_grid
        );

        if maturity <= 0.0
            || self.process.black_volatility().black_variance(maturity, strike) <= 0.0
        {
            let npv = self.degenerate_value(payoff.as_ref(), maturity, early);
            debug!(maturity, npv, "degenerate inputs, skipping the grid");
            return Ok(PricingResults::from_npv(npv));
        }

        // 0. cash dividend model
        let dividends: Vec<Dividend> = self
            .dividends
            .iter()
            .filter(|d| d.time >= 0.0 && d.time <= maturity)
            .copied()
            .collect();

        let (dividend_schedule, escrowed, spot_adjustment) = match settings.cash_dividend_model {
            CashDividendModel::Spot => (dividends, None, 0.0),
            CashDividendModel::Escrowed => {
                ql_core::ensure!(
                    self.quanto_helper.is_none(),
                    "escrowed dividend model is not supported for quanto options"
                );
                let stops = if early {
                    dividends.iter().map(|d| Dividend::new(d.time, 0.0)).collect()
                } else {
                    Vec::new()
                };
                let adjustment = Arc::new(EscrowedDividendAdjustment::new(
                    dividends,
                    Arc::clone(self.process.risk_free_rate()),
                    Arc::clone(self.process.dividend_yield()),
                    maturity,
                ));
                let spot_adjustment = adjustment.dividend_adjustment(0.0);
                ql_core::ensure!(
                    self.process.x0() + spot_adjustment > 0.0,
                    "spot minus dividends becomes negative"
                );
                (stops, Some(adjustment), spot_adjustment)
            }
        };

        debug!(
            t_grid = settings.t_grid,
            x_grid = settings.x_grid,
            damping_steps = settings.damping_steps,
            scheme = %settings.scheme_desc.scheme_type,
            maturity,
            dividends = dividend_schedule.len(),
            "fd black-scholes vanilla engine"
        );

        // 1. mesher
        let equity_mesher = FdmBlackScholesMesher::new(
            settings.x_grid,
            &self.process,
            maturity,
            strike,
            None,
            None,
            1e-4,
            1.5,
            Some((strike, 0.1)),
            &dividend_schedule,
            self.quanto_helper.as_deref(),
            spot_adjustment,
        )?;
        let mesher = Arc::new(FdmMesherComposite::from_1d(equity_mesher));

        // 2. inner value calculator
        let base_payoff: Arc<dyn Payoff> = Arc::clone(payoff).into_payoff();
        let calculator: Arc<dyn FdmInnerValueCalculator> = match escrowed {
            Some(adjustment) => Arc::new(FdmEscrowedLogInnerValue::new(
                adjustment,
                base_payoff,
                Arc::clone(&mesher),
                0,
            )),
            None => Arc::new(FdmLogInnerValue::new(base_payoff, Arc::clone(&mesher), 0)),
        };

        // 3. step conditions
        let condition = FdmStepConditionComposite::vanilla_composite(
            &dividend_schedule,
            &args.exercise,
            Arc::clone(&mesher),
            Arc::clone(&calculator),
        )?;

        // 4. boundary conditions, 5. solver
        let solver_desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition,
            calculator,
            maturity,
            time_steps: settings.t_grid,
            damping_steps: settings.damping_steps,
        };
        let solver = FdmBlackScholesSolver::new(
            &self.process,
            strike,
            &solver_desc,
            settings.scheme_desc,
            self.quanto_helper.clone(),
        )?;

        let spot = self.process.x0() + spot_adjustment;
        let mut results = PricingResults::from_npv(solver.value_at(spot))
            .with_result("delta", solver.delta_at(spot))
            .with_result("gamma", solver.gamma_at(spot));
        if let Some(theta) = solver.theta_at(spot) {
            results = results.with_result("theta", theta);
        }
        Ok(results)
    }
}

/// Builder for [`FdBlackScholesVanillaEngine`].
///
/// Corresponds to `QuantLib::MakeFdBlackScholesVanillaEngine`.
#[derive(Debug, Clone)]
pub struct MakeFdBlackScholesVanillaEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    dividends: Vec<Dividend>,
    quanto_helper: Option<Arc<FdmQuantoHelper>>,
    settings: FdBlackScholesVanillaSettings,
}

impl MakeFdBlackScholesVanillaEngine {
    /// Start from the default settings.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            process,
            dividends: Vec::new(),
            quanto_helper: None,
            settings: FdBlackScholesVanillaSettings::default(),
        }
    }

    /// Number of time steps.
    pub fn with_t_grid(mut self, t_grid: Size) -> Self {
        self.settings.t_grid = t_grid;
        self
    }

    /// Number of spot grid points.
    pub fn with_x_grid(mut self, x_grid: Size) -> Self {
        self.settings.x_grid = x_grid;
        self
    }

    /// Implicit Euler damping steps.
    pub fn with_damping_steps(mut self, damping_steps: Size) -> Self {
        self.settings.damping_steps = damping_steps;
        self
    }

    /// Time-stepping scheme.
    pub fn with_fdm_scheme_desc(mut self, scheme_desc: FdmSchemeDesc) -> Self {
        self.settings.scheme_desc = scheme_desc;
        self
    }

    /// Cash dividends paid at the given times.
    pub fn with_cash_dividends(mut self, times: &[Time], amounts: &[Real]) -> Result<Self> {
        self.dividends = ql_instruments::dividend_vector(times, amounts)?;
        Ok(self)
    }

    /// Treatment of cash dividends.
    pub fn with_cash_dividend_model(mut self, model: CashDividendModel) -> Self {
        self.settings.cash_dividend_model = model;
        self
    }

    /// Quanto adjustment of the drift.
    pub fn with_quanto_helper(mut self, quanto_helper: Arc<FdmQuantoHelper>) -> Self {
        self.quanto_helper = Some(quanto_helper);
        self
    }

    /// Replace all settings at once, e.g. with values loaded from a file.
    pub fn with_settings(mut self, settings: FdBlackScholesVanillaSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The configured engine.
    pub fn build(self) -> FdBlackScholesVanillaEngine {
        FdBlackScholesVanillaEngine::with_settings(
            self.process,
            self.dividends,
            self.quanto_helper,
            self.settings,
        )
    }
}
