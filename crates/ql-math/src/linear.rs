//! Iterative linear solvers (translates `ql/math/matrixutilities/bicgstab.hpp`).
//!
//! The operator and the preconditioner are supplied as closures acting on
//! slices, so callers never materialise a matrix. Internally the Krylov
//! vectors are `nalgebra::DVector`s.

use nalgebra::DVector;
use ql_core::{
    errors::{Error, Result},
    Real,
};

/// Outcome of a successful [`BiCGStab`] solve.
#[derive(Debug, Clone, PartialEq)]
pub struct BiCGStabResult {
    /// Iterations performed.
    pub iterations: usize,
    /// Relative residual `|b - A x| / |b|` reached.
    pub error: Real,
    /// The solution.
    pub x: Vec<Real>,
}

/// Biconjugate gradient stabilised method with optional right
/// preconditioning.
///
/// Corresponds to `QuantLib::BiCGstab`.
#[derive(Debug, Clone, Copy)]
pub struct BiCGStab {
    max_iterations: usize,
    rel_tol: Real,
}

impl BiCGStab {
    /// A solver stopping at relative residual `rel_tol` or after
    /// `max_iterations`.
    pub fn new(max_iterations: usize, rel_tol: Real) -> Self {
        Self {
            max_iterations,
            rel_tol,
        }
    }

    /// Solve `A x = b` without a preconditioner.
    pub fn solve<A>(&self, a: A, b: &[Real], x0: &[Real]) -> Result<BiCGStabResult>
    where
        A: FnMut(&[Real]) -> Result<Vec<Real>>,
    {
        self.solve_preconditioned(a, |v: &[Real]| Ok(v.to_vec()), b, x0)
    }

    /// Solve `A x = b` starting from `x0` (an empty `x0` starts from zero),
    /// applying `m` as an approximate inverse of `A`.
    ///
    /// # Errors
    /// `MaxEvaluationsExceeded` when the iteration budget runs out,
    /// `NotConverged` when the iteration breaks down above tolerance, and any
    /// error raised by `a` or `m`.
    pub fn solve_preconditioned<A, M>(
        &self,
        mut a: A,
        mut m: M,
        b: &[Real],
        x0: &[Real],
    ) -> Result<BiCGStabResult>
    where
        A: FnMut(&[Real]) -> Result<Vec<Real>>,
        M: FnMut(&[Real]) -> Result<Vec<Real>>,
    {
        let mut apply = |v: &DVector<Real>| -> Result<DVector<Real>> {
            Ok(DVector::from_vec(a(v.as_slice())?))
        };
        let mut precondition = |v: &DVector<Real>| -> Result<DVector<Real>> {
            Ok(DVector::from_vec(m(v.as_slice())?))
        };

        let b = DVector::from_column_slice(b);
        let b_norm = b.norm();
        if b_norm == 0.0 {
            return Ok(BiCGStabResult {
                iterations: 0,
                error: 0.0,
                x: b.as_slice().to_vec(),
            });
        }

        let mut x = if x0.is_empty() {
            DVector::zeros(b.len())
        } else {
            ql_core::ensure!(
                x0.len() == b.len(),
                "initial guess size ({}) differs from rhs size ({})",
                x0.len(),
                b.len()
            );
            DVector::from_column_slice(x0)
        };

        let mut r = &b - apply(&x)?;
        let r_tld = r.clone();
        let mut p = DVector::zeros(b.len());
        let mut v = DVector::zeros(b.len());
        let mut omega: Real = 1.0;
        let mut rho_tld: Real = 1.0;
        let mut alpha: Real = 0.0;
        let mut error = r.norm() / b_norm;

        let mut i = 0;
        while i < self.max_iterations && error >= self.rel_tol {
            let rho = r_tld.dot(&r);
            if rho == 0.0 || omega == 0.0 {
                break;
            }

            if i > 0 {
                let beta = (rho / rho_tld) * (alpha / omega);
                p = &r + beta * (&p - omega * &v);
            } else {
                p = r.clone();
            }

            let p_tld = precondition(&p)?;
            v = apply(&p_tld)?;
            alpha = rho / r_tld.dot(&v);
            let s = &r - alpha * &v;
            if s.norm() < self.rel_tol * b_norm {
                x += alpha * &p_tld;
                error = s.norm() / b_norm;
                break;
            }

            let s_tld = precondition(&s)?;
            let t = apply(&s_tld)?;
            omega = t.dot(&s) / t.dot(&t);
            x += alpha * &p_tld + omega * &s_tld;
            r = &s - omega * &t;
            error = r.norm() / b_norm;
            rho_tld = rho;
            i += 1;
        }

        if i >= self.max_iterations {
            return Err(Error::MaxEvaluationsExceeded {
                routine: "BiCGStab",
                max: self.max_iterations,
            });
        }
        if error >= self.rel_tol {
            return Err(Error::NotConverged {
                routine: "BiCGStab",
                iterations: i,
                tolerance: self.rel_tol,
                residual: error,
            });
        }

        Ok(BiCGStabResult {
            iterations: i,
            error,
            x: x.as_slice().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::DMatrix;

    fn matvec(m: &DMatrix<Real>) -> impl FnMut(&[Real]) -> Result<Vec<Real>> + '_ {
        move |v: &[Real]| Ok((m * DVector::from_column_slice(v)).as_slice().to_vec())
    }

    #[test]
    fn solves_nonsymmetric_system() {
        let m = DMatrix::from_row_slice(
            3,
            3,
            &[4.0, 1.0, 0.0, 2.0, 5.0, 1.0, 0.0, 1.5, 3.0],
        );
        let b = [1.0, 2.0, 3.0];
        let res = BiCGStab::new(50, 1e-12).solve(matvec(&m), &b, &[]).unwrap();

        let check = &m * DVector::from_column_slice(&res.x);
        for (c, bi) in check.iter().zip(&b) {
            assert_abs_diff_eq!(*c, *bi, epsilon = 1e-10);
        }
        assert!(res.error < 1e-12);
    }

    #[test]
    fn exact_preconditioner_converges_immediately() {
        let m = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 2.0]);
        let inv = m.clone().try_inverse().unwrap();
        let res = BiCGStab::new(10, 1e-10)
            .solve_preconditioned(matvec(&m), matvec(&inv), &[1.0, 1.0], &[])
            .unwrap();
        assert_eq!(res.iterations, 0);
        assert_abs_diff_eq!(res.x[0], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(res.x[1], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn zero_rhs_returns_zero() {
        let m = DMatrix::<Real>::identity(3, 3);
        let res = BiCGStab::new(10, 1e-8).solve(matvec(&m), &[0.0; 3], &[]).unwrap();
        assert_eq!(res.x, vec![0.0; 3]);
        assert_eq!(res.iterations, 0);
    }

    #[test]
    fn exhausted_budget_is_reported() {
        let n = 30;
        let m = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                2.0 + i as Real
            } else if i + 1 == j || j + 1 == i {
                -1.0
            } else {
                0.0
            }
        });
        let b = vec![1.0; n];
        let err = BiCGStab::new(1, 1e-14).solve(matvec(&m), &b, &[]).unwrap_err();
        assert!(matches!(err, Error::MaxEvaluationsExceeded { .. }));
    }

    #[test]
    fn operator_errors_propagate() {
        let err = BiCGStab::new(5, 1e-8)
            .solve(|_: &[Real]| Err(Error::SingularPivot { row: 2 }), &[1.0], &[])
            .unwrap_err();
        assert_eq!(err, Error::SingularPivot { row: 2 });
    }
}
