//! Discrete cash dividends (translates `ql/cashflows/dividend.hpp`).

use ql_core::{errors::Result, Real, Time};

/// A fixed cash dividend paid at `time`.
///
/// Corresponds to `QuantLib::FixedDividend`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dividend {
    /// Payment time in years.
    pub time: Time,
    /// Cash amount.
    pub amount: Real,
}

impl Dividend {
    /// Create a dividend.
    pub fn new(time: Time, amount: Real) -> Self {
        Self { time, amount }
    }
}

/// Build a dividend schedule from parallel time and amount slices.
///
/// Corresponds to `QuantLib::DividendVector`.
pub fn dividend_vector(times: &[Time], amounts: &[Real]) -> Result<Vec<Dividend>> {
    ql_core::ensure!(
        times.len() == amounts.len(),
        "size mismatch between dividend times ({}) and amounts ({})",
        times.len(),
        amounts.len()
    );
    Ok(times
        .iter()
        .zip(amounts)
        .map(|(&t, &a)| Dividend::new(t, a))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_schedule() {
        let divs = dividend_vector(&[0.25, 0.75], &[1.0, 1.5]).unwrap();
        assert_eq!(divs, vec![Dividend::new(0.25, 1.0), Dividend::new(0.75, 1.5)]);
    }

    #[test]
    fn rejects_mismatch() {
        assert!(dividend_vector(&[0.25], &[1.0, 2.0]).is_err());
    }
}
