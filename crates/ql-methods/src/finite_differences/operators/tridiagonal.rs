//! General one-dimensional tridiagonal operator
//! (translates `ql/methods/finitedifferences/tridiagonaloperator.hpp`).

use ql_core::{
    errors::{Error, Result},
    Real, Size,
};
use ql_math::close;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A tridiagonal matrix operator.
///
/// Stores the lower, diagonal, and upper bands, all of length `n`. Used for
/// 1-D finite difference discretisations of second-order PDEs and as the
/// target of the boundary-condition row hooks.
///
/// Corresponds to `QuantLib::TridiagonalOperator`.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalOperator {
    /// Lower diagonal (index 0 unused: starts from row 1).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused: ends at row n−2).
    pub upper: Vec<Real>,
}

const SOR_MAX_ITERATIONS: usize = 100_000;

impl TridiagonalOperator {
    /// Create a zero tridiagonal operator of size `n`.
    pub fn new(n: Size) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// The identity of size `n`.
    pub fn identity(n: Size) -> Self {
        Self {
            diag: vec![1.0; n],
            ..Self::new(n)
        }
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Set row 0 to `(b, c)`.
    pub fn set_first_row(&mut self, b: Real, c: Real) {
        self.diag[0] = b;
        self.upper[0] = c;
    }

    /// Set row `i` (`0 < i < n-1`) to `(a, b, c)`.
    pub fn set_mid_row(&mut self, i: Size, a: Real, b: Real, c: Real) {
        debug_assert!(i >= 1 && i + 1 < self.size(), "row {i} is not an interior row");
        self.lower[i] = a;
        self.diag[i] = b;
        self.upper[i] = c;
    }

    /// Set every interior row to `(a, b, c)`.
    pub fn set_mid_rows(&mut self, a: Real, b: Real, c: Real) {
        let n = self.size();
        for i in 1..n.saturating_sub(1) {
            self.set_mid_row(i, a, b, c);
        }
    }

    /// Set the last row to `(a, b)`.
    pub fn set_last_row(&mut self, a: Real, b: Real) {
        let n = self.size();
        self.lower[n - 1] = a;
        self.diag[n - 1] = b;
    }

    /// Apply the operator: `y = A · x`.
    pub fn apply(&self, x: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        ql_core::ensure!(
            x.len() == n,
            "vector of size {} applied to operator of size {n}",
            x.len()
        );
        if n == 1 {
            return Ok(vec![self.diag[0] * x[0]]);
        }
        let mut y = vec![0.0; n];
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 1] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        Ok(y)
    }

    /// Solve `A · x = rhs` using the Thomas algorithm (LU decomposition
    /// for tridiagonal systems).
    ///
    /// # Errors
    /// `SingularPivot` when a pivot is numerically zero.
    pub fn solve_for(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        ql_core::ensure!(n > 0, "uninitialized tridiagonal operator");
        ql_core::ensure!(
            rhs.len() == n,
            "rhs vector of size {} instead of {n}",
            rhs.len()
        );

        let mut c_prime = vec![0.0; n];
        let mut x = vec![0.0; n];

        let mut bet = self.diag[0];
        if close(bet, 0.0) {
            return Err(Error::SingularPivot { row: 0 });
        }
        x[0] = rhs[0] / bet;

        // Forward sweep
        for j in 1..n {
            c_prime[j] = self.upper[j - 1] / bet;
            bet = self.diag[j] - self.lower[j] * c_prime[j];
            if close(bet, 0.0) {
                return Err(Error::SingularPivot { row: j });
            }
            x[j] = (rhs[j] - self.lower[j] * x[j - 1]) / bet;
        }

        // Back substitution
        for j in (0..n.saturating_sub(1)).rev() {
            x[j] -= c_prime[j + 1] * x[j + 1];
        }
        Ok(x)
    }

    /// Solve `A · x = rhs` by successive over-relaxation (ω = 1.5), starting
    /// from `rhs`, until the squared update falls below `tol`.
    ///
    /// # Errors
    /// `NotConverged` after 100 000 sweeps.
    pub fn sor(&self, rhs: &[Real], tol: Real) -> Result<Vec<Real>> {
        let n = self.size();
        ql_core::ensure!(n >= 2, "SOR needs at least two rows, got {n}");
        ql_core::ensure!(
            rhs.len() == n,
            "rhs vector of size {} instead of {n}",
            rhs.len()
        );

        const OMEGA: Real = 1.5;
        let mut x = rhs.to_vec();
        let mut err = 2.0 * tol;
        let mut iterations = 0;
        while err > tol {
            if iterations >= SOR_MAX_ITERATIONS {
                return Err(Error::NotConverged {
                    routine: "SOR",
                    iterations,
                    tolerance: tol,
                    residual: err,
                });
            }

            let mut temp =
                OMEGA * (rhs[0] - self.upper[0] * x[1] - self.diag[0] * x[0]) / self.diag[0];
            err = temp * temp;
            x[0] += temp;

            for i in 1..n - 1 {
                temp = OMEGA
                    * (rhs[i]
                        - self.upper[i] * x[i + 1]
                        - self.diag[i] * x[i]
                        - self.lower[i] * x[i - 1])
                    / self.diag[i];
                err += temp * temp;
                x[i] += temp;
            }

            let last = n - 1;
            temp = OMEGA * (rhs[last] - self.diag[last] * x[last] - self.lower[last] * x[last - 1])
                / self.diag[last];
            err += temp * temp;
            x[last] += temp;

            iterations += 1;
        }
        Ok(x)
    }

    fn zip_with(&self, other: &Self, f: impl Fn(Real, Real) -> Real) -> Self {
        debug_assert_eq!(self.size(), other.size());
        let zip = |a: &[Real], b: &[Real]| a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect();
        Self {
            lower: zip(&self.lower, &other.lower),
            diag: zip(&self.diag, &other.diag),
            upper: zip(&self.upper, &other.upper),
        }
    }

    fn map(&self, f: impl Fn(Real) -> Real) -> Self {
        let map = |a: &[Real]| a.iter().map(|x| f(*x)).collect();
        Self {
            lower: map(&self.lower),
            diag: map(&self.diag),
            upper: map(&self.upper),
        }
    }
}

impl Add for &TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn add(self, rhs: &TridiagonalOperator) -> TridiagonalOperator {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for &TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn sub(self, rhs: &TridiagonalOperator) -> TridiagonalOperator {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul<Real> for &TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn mul(self, rhs: Real) -> TridiagonalOperator {
        self.map(|a| a * rhs)
    }
}

impl Div<Real> for &TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn div(self, rhs: Real) -> TridiagonalOperator {
        self.map(|a| a / rhs)
    }
}

impl Neg for &TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn neg(self) -> TridiagonalOperator {
        self.map(|a| -a)
    }
}

impl Add for TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn add(self, rhs: TridiagonalOperator) -> TridiagonalOperator {
        &self + &rhs
    }
}

impl Sub for TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn sub(self, rhs: TridiagonalOperator) -> TridiagonalOperator {
        &self - &rhs
    }
}

impl Mul<Real> for TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn mul(self, rhs: Real) -> TridiagonalOperator {
        &self * rhs
    }
}

impl Div<Real> for TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn div(self, rhs: Real) -> TridiagonalOperator {
        &self / rhs
    }
}

impl Neg for TridiagonalOperator {
    type Output = TridiagonalOperator;

    fn neg(self) -> TridiagonalOperator {
        -&self
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn laplacian(n: usize) -> TridiagonalOperator {
        let mut op = TridiagonalOperator::new(n);
        op.set_first_row(2.0, -1.0);
        op.set_mid_rows(-1.0, 2.0, -1.0);
        op.set_last_row(-1.0, 2.0);
        op
    }

    #[test]
    fn thomas_algorithm_solves_identity() {
        let op = TridiagonalOperator::identity(4);
        let rhs = vec![1.0, 2.0, 3.0, 4.0];
        let x = op.solve_for(&rhs).unwrap();
        for i in 0..4 {
            assert!((x[i] - rhs[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn thomas_algorithm_solves_tridiagonal() {
        // A = [[2, -1, 0], [-1, 2, -1], [0, -1, 2]]
        // x = [1, 2, 3]
        // Ax = [0, 0, 4]
        let op = laplacian(3);
        let x = op.solve_for(&[0.0, 0.0, 4.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
        assert!((x[2] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn singular_pivot_is_an_error() {
        let op = TridiagonalOperator::new(3);
        assert_eq!(
            op.solve_for(&[1.0, 1.0, 1.0]).unwrap_err(),
            Error::SingularPivot { row: 0 }
        );
    }

    #[test]
    fn sor_agrees_with_thomas() {
        let op = laplacian(8);
        let rhs: Vec<Real> = (0..8).map(|i| i as Real).collect();
        let direct = op.solve_for(&rhs).unwrap();
        let iterative = op.sor(&rhs, 1e-20).unwrap();
        for (d, s) in direct.iter().zip(&iterative) {
            assert_abs_diff_eq!(d, s, epsilon = 1e-8);
        }
    }

    #[test]
    fn arithmetic_has_value_semantics() {
        let a = laplacian(4);
        let i = TridiagonalOperator::identity(4);
        let sum = &a + &i;
        assert_eq!(sum.diag, vec![3.0; 4]);
        assert_eq!((&sum - &i), a);
        assert_eq!((&a * 2.0).upper[0], -2.0);
        assert_eq!((&a / 2.0).diag[1], 1.0);
        assert_eq!((-a.clone()).lower[2], 1.0);
        assert_eq!(a.diag, vec![2.0; 4]);
    }

    proptest! {
        #[test]
        fn solve_inverts_apply(
            diag in proptest::collection::vec(4.0..10.0f64, 3..40),
            off in -1.5..1.5f64,
            seed in -5.0..5.0f64,
        ) {
            let n = diag.len();
            let mut op = TridiagonalOperator::new(n);
            op.set_first_row(diag[0], off);
            for i in 1..n - 1 {
                op.set_mid_row(i, off, diag[i], -off);
            }
            op.set_last_row(-off, diag[n - 1]);

            let v: Vec<Real> = (0..n).map(|i| seed + (i as Real).sin()).collect();
            let back = op.solve_for(&op.apply(&v).unwrap()).unwrap();
            for (x, y) in v.iter().zip(&back) {
                prop_assert!((x - y).abs() < 1e-10);
            }
        }
    }
}
