//! Evenly spaced grid (translates `uniform1dmesher.hpp`).

use super::Fdm1dMesher;
use ql_core::{errors::Result, Real, Size};
use std::ops::Deref;

/// `size` evenly spaced nodes from `start` to `end`, both included.
///
/// Corresponds to `QuantLib::Uniform1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform1dMesher(Fdm1dMesher);

impl Uniform1dMesher {
    /// Create the mesher.
    ///
    /// # Errors
    /// `Precondition` if `end <= start` or `size < 2`.
    pub fn new(start: Real, end: Real, size: Size) -> Result<Self> {
        ql_core::ensure!(end > start, "end ({end}) must be greater than start ({start})");
        ql_core::ensure!(size >= 2, "a uniform mesher needs at least two nodes, got {size}");

        let dx = (end - start) / (size - 1) as Real;
        let mut locations: Vec<Real> = (0..size).map(|i| start + i as Real * dx).collect();
        locations[size - 1] = end;

        let mut dplus = vec![dx; size];
        let mut dminus = vec![dx; size];
        dplus[size - 1] = Real::NAN;
        dminus[0] = Real::NAN;

        Ok(Self(Fdm1dMesher::from_parts(locations, dplus, dminus)))
    }
}

impl Deref for Uniform1dMesher {
    type Target = Fdm1dMesher;

    fn deref(&self) -> &Fdm1dMesher {
        &self.0
    }
}

impl From<Uniform1dMesher> for Fdm1dMesher {
    fn from(m: Uniform1dMesher) -> Self {
        m.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn ends_are_exact() {
        let m = Uniform1dMesher::new(-1.0, 2.0, 7).unwrap();
        assert_eq!(m.location(0), -1.0);
        assert_eq!(m.location(6), 2.0);
        assert_abs_diff_eq!(m.location(3), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(Uniform1dMesher::new(1.0, 1.0, 10).is_err());
        assert!(Uniform1dMesher::new(0.0, 1.0, 1).is_err());
    }

    proptest! {
        #[test]
        fn spacing_is_constant(start in -10.0..10.0f64, width in 0.1..20.0f64, size in 2usize..200) {
            let m = Uniform1dMesher::new(start, start + width, size).unwrap();
            let dx = width / (size - 1) as f64;
            for i in 0..size - 1 {
                prop_assert!((m.dplus(i) - dx).abs() < 1e-12);
                prop_assert!((m.location(i + 1) - m.location(i) - dx).abs() < 1e-9);
            }
        }
    }
}
