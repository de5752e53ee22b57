//! Memory layout of a multi-dimensional grid
//! (translates `ql/methods/finitedifferences/operators/fdmlinearoplayout.hpp`).
//!
//! Grid points are stored in one flat array with the first dimension varying
//! fastest: `index = Σ coordinates[k] · spacing[k]`.

use ql_core::Size;

/// Position of a grid point: its flat index and its per-dimension coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FdmLinearOpIterator {
    /// Flat index into the value array.
    pub index: Size,
    /// Coordinate along each dimension.
    pub coordinates: Vec<Size>,
}

/// Stride mapping between flat indices and grid coordinates.
///
/// Corresponds to `QuantLib::FdmLinearOpLayout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpLayout {
    dim: Vec<Size>,
    spacing: Vec<Size>,
    size: Size,
}

impl FdmLinearOpLayout {
    /// Layout of a grid with `dim[k]` points along dimension `k`.
    pub fn new(dim: Vec<Size>) -> Self {
        let mut spacing = vec![1; dim.len()];
        for i in 1..dim.len() {
            spacing[i] = spacing[i - 1] * dim[i - 1];
        }
        let size = dim.iter().product();
        Self { dim, spacing, size }
    }

    /// Number of points per dimension.
    pub fn dim(&self) -> &[Size] {
        &self.dim
    }

    /// Stride of each dimension in the flat array.
    pub fn spacing(&self) -> &[Size] {
        &self.spacing
    }

    /// Total number of grid points.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Flat index of the point at `coordinates`.
    pub fn index(&self, coordinates: &[Size]) -> Size {
        coordinates
            .iter()
            .zip(&self.spacing)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Coordinates of the point at flat `index`.
    pub fn coordinates(&self, index: Size) -> Vec<Size> {
        let mut rest = index;
        self.dim
            .iter()
            .map(|&d| {
                let c = rest % d;
                rest /= d;
                c
            })
            .collect()
    }

    /// Flat index of the neighbour `offset` steps away along dimension `i`.
    ///
    /// Offsets that leave the grid are reflected back at the edge, so the
    /// lower neighbour of coordinate 0 is coordinate 1.
    pub fn neighbourhood(&self, index: Size, coordinates: &[Size], i: Size, offset: isize) -> Size {
        let base = index - coordinates[i] * self.spacing[i];
        base + self.reflect(coordinates[i], i, offset) * self.spacing[i]
    }

    /// Flat index of the neighbour offset along two dimensions at once.
    pub fn neighbourhood2(
        &self,
        index: Size,
        coordinates: &[Size],
        i1: Size,
        offset1: isize,
        i2: Size,
        offset2: isize,
    ) -> Size {
        let base =
            index - coordinates[i1] * self.spacing[i1] - coordinates[i2] * self.spacing[i2];
        base + self.reflect(coordinates[i1], i1, offset1) * self.spacing[i1]
            + self.reflect(coordinates[i2], i2, offset2) * self.spacing[i2]
    }

    fn reflect(&self, coordinate: Size, i: Size, offset: isize) -> Size {
        let c = coordinate as isize + offset;
        let last = self.dim[i] as isize - 1;
        let c = if c < 0 {
            -c
        } else if c > last {
            2 * last - c
        } else {
            c
        };
        c as Size
    }

    /// Iterate over all grid points in flat-index order.
    pub fn iter(&self) -> LayoutIter<'_> {
        LayoutIter {
            layout: self,
            next: (self.size > 0).then(|| FdmLinearOpIterator {
                index: 0,
                coordinates: vec![0; self.dim.len()],
            }),
        }
    }
}

/// Iterator over the points of a [`FdmLinearOpLayout`].
#[derive(Debug, Clone)]
pub struct LayoutIter<'a> {
    layout: &'a FdmLinearOpLayout,
    next: Option<FdmLinearOpIterator>,
}

impl Iterator for LayoutIter<'_> {
    type Item = FdmLinearOpIterator;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current.index + 1 < self.layout.size {
            let mut following = current.clone();
            following.index += 1;
            for (c, &d) in following.coordinates.iter_mut().zip(&self.layout.dim) {
                *c += 1;
                if *c < d {
                    break;
                }
                *c = 0;
            }
            self.next = Some(following);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self
            .next
            .as_ref()
            .map_or(0, |it| self.layout.size - it.index);
        (left, Some(left))
    }
}

impl ExactSizeIterator for LayoutIter<'_> {}

impl<'a> IntoIterator for &'a FdmLinearOpLayout {
    type Item = FdmLinearOpIterator;
    type IntoIter = LayoutIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
