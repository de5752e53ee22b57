//! Spatial grids (translates `ql/methods/finitedifferences/meshers/`).
//!
//! * [`Uniform1dMesher`]: evenly spaced nodes
//! * [`Concentrating1dMesher`]: sinh-stretched nodes around one or more points
//! * [`FdmBlackScholesMesher`]: log-spot grid sized from the forward and the vol
//! * [`FdmMesherComposite`]: tensor product of one-dimensional meshers

pub mod black_scholes;
pub mod composite;
pub mod concentrating;
pub mod uniform;

pub use black_scholes::FdmBlackScholesMesher;
pub use composite::FdmMesherComposite;
pub use concentrating::Concentrating1dMesher;
pub use uniform::Uniform1dMesher;

use ql_core::{errors::Result, Real, Size};

/// A one-dimensional grid: node locations and the spacing to each neighbour.
///
/// `dminus[0]` and `dplus[n-1]` have no neighbour and hold `NaN`.
///
/// Corresponds to `QuantLib::Fdm1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fdm1dMesher {
    locations: Vec<Real>,
    dplus: Vec<Real>,
    dminus: Vec<Real>,
}

impl Fdm1dMesher {
    /// Build a mesher from strictly increasing node locations.
    pub fn from_locations(locations: Vec<Real>) -> Result<Self> {
        ql_core::ensure!(
            locations.len() >= 2,
            "a mesher needs at least two nodes, got {}",
            locations.len()
        );
        ql_core::ensure!(
            locations.windows(2).all(|w| w[1] > w[0]),
            "mesher locations must be strictly increasing"
        );
        let n = locations.len();
        let mut dplus = vec![Real::NAN; n];
        let mut dminus = vec![Real::NAN; n];
        for i in 0..n - 1 {
            dplus[i] = locations[i + 1] - locations[i];
            dminus[i + 1] = dplus[i];
        }
        Ok(Self {
            locations,
            dplus,
            dminus,
        })
    }

    /// Assemble a mesher whose spacings are known in closed form.
    pub(crate) fn from_parts(locations: Vec<Real>, dplus: Vec<Real>, dminus: Vec<Real>) -> Self {
        debug_assert!(locations.len() == dplus.len() && locations.len() == dminus.len());
        Self {
            locations,
            dplus,
            dminus,
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> Size {
        self.locations.len()
    }

    /// All node locations.
    pub fn locations(&self) -> &[Real] {
        &self.locations
    }

    /// Distances to the next node.
    pub fn dplus_all(&self) -> &[Real] {
        &self.dplus
    }

    /// Distances to the previous node.
    pub fn dminus_all(&self) -> &[Real] {
        &self.dminus
    }

    /// Location of node `i`.
    pub fn location(&self, i: Size) -> Real {
        self.locations[i]
    }

    /// `location(i+1) - location(i)`; `NaN` at the last node.
    pub fn dplus(&self, i: Size) -> Real {
        self.dplus[i]
    }

    /// `location(i) - location(i-1)`; `NaN` at the first node.
    pub fn dminus(&self, i: Size) -> Real {
        self.dminus[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacings_from_locations() {
        let m = Fdm1dMesher::from_locations(vec![0.0, 1.0, 3.0, 6.0]).unwrap();
        assert_eq!(m.size(), 4);
        assert_eq!(m.dplus(0), 1.0);
        assert_eq!(m.dminus(2), 2.0);
        assert_eq!(m.dplus(2), 3.0);
        assert!(m.dminus(0).is_nan());
        assert!(m.dplus(3).is_nan());
        for i in 0..3 {
            assert_eq!(m.dplus(i), m.dminus(i + 1));
        }
    }

    #[test]
    fn rejects_unsorted_locations() {
        assert!(Fdm1dMesher::from_locations(vec![0.0, 2.0, 1.0]).is_err());
        assert!(Fdm1dMesher::from_locations(vec![0.0]).is_err());
    }
}
