//! Tensor-product mesher (translates `fdmmeshercomposite.hpp`).

use super::Fdm1dMesher;
use crate::finite_differences::operators::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::{errors::Result, Real, Size};

/// A multi-dimensional grid built from one [`Fdm1dMesher`] per dimension.
///
/// The layout is derived from the 1-D sizes; a point's location along
/// direction `d` is the location of node `coordinates[d]` of mesher `d`.
///
/// Corresponds to `QuantLib::FdmMesherComposite`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmMesherComposite {
    layout: FdmLinearOpLayout,
    meshers: Vec<Fdm1dMesher>,
}

impl FdmMesherComposite {
    /// Combine the given meshers, the first varying fastest.
    pub fn new(meshers: Vec<Fdm1dMesher>) -> Result<Self> {
        ql_core::ensure!(!meshers.is_empty(), "at least one mesher is required");
        let layout = FdmLinearOpLayout::new(meshers.iter().map(Fdm1dMesher::size).collect());
        Ok(Self { layout, meshers })
    }

    /// A one-dimensional composite.
    pub fn from_1d(mesher: impl Into<Fdm1dMesher>) -> Self {
        let mesher = mesher.into();
        Self {
            layout: FdmLinearOpLayout::new(vec![mesher.size()]),
            meshers: vec![mesher],
        }
    }

    /// The layout of the grid.
    pub fn layout(&self) -> &FdmLinearOpLayout {
        &self.layout
    }

    /// The one-dimensional meshers.
    pub fn meshers(&self) -> &[Fdm1dMesher] {
        &self.meshers
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> Size {
        self.meshers.len()
    }

    /// Location of `iter` along `direction`.
    pub fn location(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.meshers[direction].location(iter.coordinates[direction])
    }

    /// Spacing to the next node along `direction`.
    pub fn dplus(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.meshers[direction].dplus(iter.coordinates[direction])
    }

    /// Spacing to the previous node along `direction`.
    pub fn dminus(&self, iter: &FdmLinearOpIterator, direction: Size) -> Real {
        self.meshers[direction].dminus(iter.coordinates[direction])
    }

    /// Location along `direction` of every grid point, in flat-index order.
    pub fn locations(&self, direction: Size) -> Vec<Real> {
        self.layout
            .iter()
            .map(|it| self.location(&it, direction))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Uniform1dMesher;

    #[test]
    fn locations_follow_the_layout() {
        let m = FdmMesherComposite::new(vec![
            Uniform1dMesher::new(0.0, 1.0, 3).unwrap().into(),
            Uniform1dMesher::new(10.0, 20.0, 2).unwrap().into(),
        ])
        .unwrap();
        assert_eq!(m.layout().size(), 6);
        assert_eq!(m.locations(0), vec![0.0, 0.5, 1.0, 0.0, 0.5, 1.0]);
        assert_eq!(m.locations(1), vec![10.0, 10.0, 10.0, 20.0, 20.0, 20.0]);

        let it = m.layout().iter().nth(4).unwrap();
        assert_eq!(m.location(&it, 0), 0.5);
        assert!(m.dplus(&it, 1).is_nan());
        assert_eq!(m.dminus(&it, 1), 10.0);
    }
}
