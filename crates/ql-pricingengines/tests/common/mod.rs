//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use ql_instruments::OptionType;
use ql_math::{normal_cdf, normal_pdf};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// Closed-form Black-Scholes-Merton value and `(delta, gamma, theta)` of a
/// European option with flat rates and volatility.
pub fn black_scholes(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    r: f64,
    q: f64,
    vol: f64,
    t: f64,
) -> (f64, f64, f64, f64) {
    let phi = option_type.sign();
    let sqrt_t = t.sqrt();
    let d1 = ((spot / strike).ln() + (r - q + 0.5 * vol * vol) * t) / (vol * sqrt_t);
    let d2 = d1 - vol * sqrt_t;
    let dq = (-q * t).exp();
    let dr = (-r * t).exp();

    let npv = phi * (spot * dq * normal_cdf(phi * d1) - strike * dr * normal_cdf(phi * d2));
    let delta = phi * dq * normal_cdf(phi * d1);
    let gamma = dq * normal_pdf(d1) / (spot * vol * sqrt_t);
    let theta = -spot * dq * normal_pdf(d1) * vol / (2.0 * sqrt_t)
        + phi * (q * spot * dq * normal_cdf(phi * d1) - r * strike * dr * normal_cdf(phi * d2));
    (npv, delta, gamma, theta)
}

/// Flat process with `S = 100`.
pub fn flat_process(r: f64, q: f64, vol: f64) -> Arc<GeneralizedBlackScholesProcess> {
    Arc::new(GeneralizedBlackScholesProcess::flat(100.0, r, q, vol))
}

/// Install a test subscriber once; `RUST_LOG=debug` shows the engine logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
