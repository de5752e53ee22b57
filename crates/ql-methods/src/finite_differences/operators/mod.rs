//! Spatial operators (translates `ql/methods/finitedifferences/operators/`).
//!
//! * [`FdmLinearOpLayout`]: strided index ↔ coordinate mapping
//! * [`TripleBandLinearOp`]: one-direction three-band operator on a layout
//! * [`FirstDerivativeOp`] / [`SecondDerivativeOp`]: non-uniform difference stencils
//! * [`TridiagonalOperator`]: plain 1-D tridiagonal matrix with Thomas and SOR solves
//! * [`FdmBlackScholesOp`]: the Black-Scholes generator in log-spot
//!
//! [`FdmLinearOpComposite`] is the seam between operators and schemes.

pub mod black_scholes_op;
pub mod derivatives;
pub mod layout;
pub mod tridiagonal;
pub mod triple_band;

pub use black_scholes_op::FdmBlackScholesOp;
pub use derivatives::{FirstDerivativeOp, SecondDerivativeOp};
pub use layout::{FdmLinearOpIterator, FdmLinearOpLayout};
pub use tridiagonal::TridiagonalOperator;
pub use triple_band::TripleBandLinearOp;

use nalgebra::DMatrix;
use ql_core::{errors::Result, Real, Size, Time};
use std::fmt;

/// A time-dependent operator `L = Σ L_i + L_mixed`, split by direction.
///
/// Schemes only talk to operators through this trait: they re-time it,
/// apply it (as a whole, per direction, or its mixed part) and invert the
/// per-direction parts.
///
/// Corresponds to `QuantLib::FdmLinearOpComposite`.
pub trait FdmLinearOpComposite: fmt::Debug + Send {
    /// Number of split directions.
    fn size(&self) -> Size;

    /// Refresh the coefficients for the period `[t1, t2]`.
    fn set_time(&mut self, t1: Time, t2: Time);

    /// `L r`.
    fn apply(&self, r: &[Real]) -> Vec<Real>;

    /// `L_mixed r`, the part not attributed to any single direction.
    fn apply_mixed(&self, r: &[Real]) -> Vec<Real>;

    /// `L_direction r`.
    fn apply_direction(&self, direction: Size, r: &[Real]) -> Vec<Real>;

    /// Solve `(I + a·L_direction) x = r`.
    fn solve_splitting(&self, direction: Size, r: &[Real], a: Real) -> Result<Vec<Real>>;

    /// Approximate inverse of `I + dt·L`, used to precondition Krylov solves.
    fn preconditioner(&self, r: &[Real], dt: Real) -> Result<Vec<Real>>;

    /// Dense matrices of the per-direction parts (and the mixed part, if any).
    fn to_matrix_decomp(&self) -> Vec<DMatrix<Real>>;

    /// Dense matrix of the whole operator.
    fn to_matrix(&self) -> DMatrix<Real> {
        let mut parts = self.to_matrix_decomp().into_iter();
        match parts.next() {
            Some(first) => parts.fold(first, |acc, m| acc + m),
            None => DMatrix::zeros(0, 0),
        }
    }
}
