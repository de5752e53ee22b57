//! Three-band operator along one direction of a multi-dimensional grid
//! (translates `triplebandlinearop.hpp`).

use crate::finite_differences::meshers::FdmMesherComposite;
use nalgebra::DMatrix;
use ql_core::{
    errors::{Error, Result},
    Real, Size,
};
use std::sync::Arc;

/// Operator with row `i` equal to
/// `lower[i]·r[i0[i]] + diag[i]·r[i] + upper[i]·r[i2[i]]`, where `i0` and
/// `i2` are the neighbours of `i` along the operator's direction.
///
/// The neighbour tables and the line ordering depend only on the layout and
/// are shared between copies; combining operators never touches them.
///
/// Corresponds to `QuantLib::TripleBandLinearOp`.
#[derive(Debug, Clone)]
pub struct TripleBandLinearOp {
    direction: Size,
    line_length: Size,
    i0: Arc<[Size]>,
    i2: Arc<[Size]>,
    reverse_index: Arc<[Size]>,
    pub(crate) lower: Vec<Real>,
    pub(crate) diag: Vec<Real>,
    pub(crate) upper: Vec<Real>,
}

impl TripleBandLinearOp {
    /// A zero operator along `direction` of `mesher`'s layout.
    pub fn new(direction: Size, mesher: &FdmMesherComposite) -> Self {
        let layout = mesher.layout();
        let size = layout.size();

        let mut new_dim = layout.dim().to_vec();
        new_dim.swap(0, direction);
        let mut new_spacing = super::FdmLinearOpLayout::new(new_dim).spacing().to_vec();
        new_spacing.swap(0, direction);

        let mut i0 = vec![0; size];
        let mut i2 = vec![0; size];
        let mut reverse_index = vec![0; size];
        for it in layout.iter() {
            let i = it.index;
            i0[i] = layout.neighbourhood(i, &it.coordinates, direction, -1);
            i2[i] = layout.neighbourhood(i, &it.coordinates, direction, 1);
            let new_index: Size = it
                .coordinates
                .iter()
                .zip(&new_spacing)
                .map(|(c, s)| c * s)
                .sum();
            reverse_index[new_index] = i;
        }

        Self {
            direction,
            line_length: layout.dim()[direction],
            i0: i0.into(),
            i2: i2.into(),
            reverse_index: reverse_index.into(),
            lower: vec![0.0; size],
            diag: vec![0.0; size],
            upper: vec![0.0; size],
        }
    }

    /// The direction the bands couple.
    pub fn direction(&self) -> Size {
        self.direction
    }

    /// Number of rows.
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Coefficients of the lower neighbours.
    pub fn lower(&self) -> &[Real] {
        &self.lower
    }

    /// Diagonal coefficients.
    pub fn diag(&self) -> &[Real] {
        &self.diag
    }

    /// Coefficients of the upper neighbours.
    pub fn upper(&self) -> &[Real] {
        &self.upper
    }

    fn with_bands(&self, lower: Vec<Real>, diag: Vec<Real>, upper: Vec<Real>) -> Self {
        Self {
            direction: self.direction,
            line_length: self.line_length,
            i0: Arc::clone(&self.i0),
            i2: Arc::clone(&self.i2),
            reverse_index: Arc::clone(&self.reverse_index),
            lower,
            diag,
            upper,
        }
    }

    /// `diag(u)·L`: row `i` scaled by `u[i]`.
    pub fn mult(&self, u: &[Real]) -> Self {
        let scale = |band: &[Real]| band.iter().zip(u).map(|(b, s)| b * s).collect();
        self.with_bands(scale(&self.lower), scale(&self.diag), scale(&self.upper))
    }

    /// `L·diag(u)`: each coefficient scaled by `u` at the column it multiplies.
    pub fn mult_r(&self, u: &[Real]) -> Self {
        let n = self.size();
        let lower = (0..n).map(|i| self.lower[i] * u[self.i0[i]]).collect();
        let diag = (0..n).map(|i| self.diag[i] * u[i]).collect();
        let upper = (0..n).map(|i| self.upper[i] * u[self.i2[i]]).collect();
        self.with_bands(lower, diag, upper)
    }

    /// Sum of two operators along the same direction.
    pub fn add(&self, m: &TripleBandLinearOp) -> Self {
        debug_assert_eq!(self.direction, m.direction);
        let sum = |a: &[Real], b: &[Real]| a.iter().zip(b).map(|(x, y)| x + y).collect();
        self.with_bands(
            sum(&self.lower, &m.lower),
            sum(&self.diag, &m.diag),
            sum(&self.upper, &m.upper),
        )
    }

    /// `L + diag(u)`.
    pub fn add_diagonal(&self, u: &[Real]) -> Self {
        let diag = self.diag.iter().zip(u).map(|(d, x)| d + x).collect();
        self.with_bands(self.lower.clone(), diag, self.upper.clone())
    }

    /// `s·L`.
    pub fn scale(&self, s: Real) -> Self {
        let scale = |band: &[Real]| band.iter().map(|b| b * s).collect();
        self.with_bands(scale(&self.lower), scale(&self.diag), scale(&self.upper))
    }

    /// Overwrite the bands with `diag(a)·x + y + diag(b)`.
    ///
    /// `a` and `b` hold either one value per row or a single value used for
    /// every row; an empty slice stands for zero.
    pub fn axpyb(&mut self, a: &[Real], x: &TripleBandLinearOp, y: &TripleBandLinearOp, b: &[Real]) {
        let a_at = |i: Size| match a.len() {
            0 => 0.0,
            1 => a[0],
            _ => a[i],
        };
        let b_at = |i: Size| match b.len() {
            0 => 0.0,
            1 => b[0],
            _ => b[i],
        };
        for i in 0..self.size() {
            let s = a_at(i);
            self.lower[i] = y.lower[i] + s * x.lower[i];
            self.diag[i] = y.diag[i] + s * x.diag[i] + b_at(i);
            self.upper[i] = y.upper[i] + s * x.upper[i];
        }
    }

    /// `L r`.
    pub fn apply(&self, r: &[Real]) -> Vec<Real> {
        (0..self.size())
            .map(|i| {
                r[self.i0[i]] * self.lower[i] + r[i] * self.diag[i] + r[self.i2[i]] * self.upper[i]
            })
            .collect()
    }

    /// Solve `(b·I + a·L) x = r` with one Thomas sweep per grid line.
    ///
    /// Coupling across the ends of a line (the reflected neighbours) is
    /// ignored, which is exact for the derivative stencils whose boundary
    /// rows are one-sided.
    ///
    /// # Errors
    /// `SingularPivot` if a pivot vanishes.
    pub fn solve_splitting(&self, r: &[Real], a: Real, b: Real) -> Result<Vec<Real>> {
        let n = self.size();
        ql_core::ensure!(
            r.len() == n,
            "rhs size ({}) differs from operator size ({n})",
            r.len()
        );

        let rhs: Vec<Real> = self.reverse_index.iter().map(|&i| r[i]).collect();
        let mut solution = vec![0.0; n];
        self.solve_lines(&rhs, &mut solution, a, b)?;

        let mut ret = vec![0.0; n];
        for (&i, &v) in self.reverse_index.iter().zip(&solution) {
            ret[i] = v;
        }
        Ok(ret)
    }

    #[cfg(feature = "parallel")]
    fn solve_lines(&self, rhs: &[Real], out: &mut [Real], a: Real, b: Real) -> Result<()> {
        use rayon::prelude::*;

        let m = self.line_length;
        if rhs.len() > m {
            out.par_chunks_mut(m)
                .zip(rhs.par_chunks(m))
                .zip(self.reverse_index.par_chunks(m))
                .try_for_each(|((out, rhs), idx)| self.solve_line(idx, rhs, out, a, b))
        } else {
            self.solve_line(&self.reverse_index, rhs, out, a, b)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_lines(&self, rhs: &[Real], out: &mut [Real], a: Real, b: Real) -> Result<()> {
        let m = self.line_length;
        for ((out, rhs), idx) in out
            .chunks_mut(m)
            .zip(rhs.chunks(m))
            .zip(self.reverse_index.chunks(m))
        {
            self.solve_line(idx, rhs, out, a, b)?;
        }
        Ok(())
    }

    /// Thomas algorithm on the line whose rows are `idx`, in line order.
    fn solve_line(
        &self,
        idx: &[Size],
        rhs: &[Real],
        out: &mut [Real],
        a: Real,
        b: Real,
    ) -> Result<()> {
        let n = idx.len();
        let mut tmp = vec![0.0; n];

        let mut bet = a * self.diag[idx[0]] + b;
        if bet == 0.0 {
            return Err(Error::SingularPivot { row: idx[0] });
        }
        out[0] = rhs[0] / bet;
        for j in 1..n {
            let (ri, rim1) = (idx[j], idx[j - 1]);
            tmp[j] = a * self.upper[rim1] / bet;
            bet = b + a * (self.diag[ri] - tmp[j] * self.lower[ri]);
            if bet == 0.0 {
                return Err(Error::SingularPivot { row: ri });
            }
            out[j] = (rhs[j] - a * self.lower[ri] * out[j - 1]) / bet;
        }
        for j in (0..n - 1).rev() {
            out[j] -= tmp[j + 1] * out[j + 1];
        }
        Ok(())
    }

    /// Dense matrix of the operator.
    pub fn to_matrix(&self) -> DMatrix<Real> {
        let n = self.size();
        let mut m = DMatrix::zeros(n, n);
        for i in 0..n {
            m[(i, self.i0[i])] += self.lower[i];
            m[(i, i)] += self.diag[i];
            m[(i, self.i2[i])] += self.upper[i];
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, Uniform1dMesher};
    use approx::assert_abs_diff_eq;
    use nalgebra::DVector;

    fn mesher_2d() -> FdmMesherComposite {
        FdmMesherComposite::new(vec![
            Uniform1dMesher::new(0.0, 1.0, 4).unwrap().into(),
            Fdm1dMesher::from_locations(vec![0.0, 0.3, 0.7, 1.5, 2.0]).unwrap(),
        ])
        .unwrap()
    }

    fn banded(direction: Size, mesher: &FdmMesherComposite) -> TripleBandLinearOp {
        let mut op = TripleBandLinearOp::new(direction, mesher);
        let layout = mesher.layout();
        for it in layout.iter() {
            let i = it.index;
            let c = it.coordinates[direction];
            let last = layout.dim()[direction] - 1;
            op.lower[i] = if c == 0 { 0.0 } else { -0.3 - 0.01 * i as Real };
            op.diag[i] = 1.5 + 0.1 * i as Real;
            op.upper[i] = if c == last { 0.0 } else { 0.4 + 0.02 * i as Real };
        }
        op
    }

    #[test]
    fn lines_are_contiguous_in_reverse_index() {
        let m = mesher_2d();
        let op = TripleBandLinearOp::new(1, &m);
        // the first line along direction 1 holds x-coordinate 0
        let first: Vec<Size> = op.reverse_index[..5].to_vec();
        assert_eq!(first, vec![0, 4, 8, 12, 16]);
    }

    #[test]
    fn apply_matches_dense_matrix() {
        let m = mesher_2d();
        for direction in 0..2 {
            let op = banded(direction, &m);
            let r: Vec<Real> = (0..20).map(|i| (i as Real * 0.7).sin()).collect();
            let dense = &op.to_matrix() * DVector::from_vec(r.clone());
            for (x, y) in op.apply(&r).iter().zip(dense.iter()) {
                assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn solve_splitting_inverts_b_plus_a_l() {
        let m = mesher_2d();
        for direction in 0..2 {
            let op = banded(direction, &m);
            let (a, b) = (-0.25, 1.0);
            let x: Vec<Real> = (0..20).map(|i| 1.0 + (i as Real).cos()).collect();
            let ax = op.apply(&x);
            let r: Vec<Real> = x.iter().zip(&ax).map(|(xi, li)| b * xi + a * li).collect();
            let solved = op.solve_splitting(&r, a, b).unwrap();
            for (s, e) in solved.iter().zip(&x) {
                assert_abs_diff_eq!(*s, *e, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn zero_pivot_is_reported() {
        let m = mesher_2d();
        let op = TripleBandLinearOp::new(0, &m);
        let err = op.solve_splitting(&[1.0; 20], 1.0, 0.0).unwrap_err();
        assert!(matches!(err, Error::SingularPivot { .. }), "{err}");
    }

    #[test]
    fn combinations_are_pure() {
        let m = mesher_2d();
        let op = banded(0, &m);
        let ones = vec![1.0; 20];
        let twos = vec![2.0; 20];

        let doubled = op.mult(&twos);
        assert_abs_diff_eq!(doubled.diag()[3], 2.0 * op.diag()[3], epsilon = 1e-12);
        assert_eq!(op.scale(2.0).upper(), doubled.upper());
        assert_eq!(op.add(&op).lower(), doubled.lower());
        assert_eq!(op.mult_r(&ones).diag(), op.diag());
        assert_abs_diff_eq!(op.add_diagonal(&ones).diag()[5], op.diag()[5] + 1.0, epsilon = 1e-12);

        let mut target = TripleBandLinearOp::new(0, &m);
        target.axpyb(&[3.0], &op, &op, &[-1.0]);
        assert_abs_diff_eq!(target.lower()[7], 4.0 * op.lower()[7], epsilon = 1e-12);
        assert_abs_diff_eq!(target.diag()[7], 4.0 * op.diag()[7] - 1.0, epsilon = 1e-12);

        target.axpyb(&[], &op, &op, &[]);
        assert_eq!(target.diag(), op.diag());
    }
}
