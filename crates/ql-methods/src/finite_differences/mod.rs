//! Finite difference methods for PDE-based option pricing.
//!
//! Translates the operator-splitting framework of
//! `ql/methods/finitedifferences/`. A pricing request flows through the
//! submodules in this order:
//!
//! mesher → operators → inner values / boundary conditions → step conditions
//! → schemes → backward solver → 1-D solver (interpolation and Greeks).
//!
//! Everything is built per request and dropped afterwards; the only shared
//! state is the immutable mesher held behind an `Arc`.

pub mod boundary_conditions;
pub mod meshers;
pub mod operators;
pub mod schemes;
pub mod solvers;
pub mod step_conditions;
pub mod utilities;

use ql_core::Real;

/// `y[i] += a * x[i]` for equally sized slices.
pub(crate) fn axpy(y: &mut [Real], a: Real, x: &[Real]) {
    debug_assert_eq!(y.len(), x.len());
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += a * xi;
    }
}

/// Element-wise `x - y`.
pub(crate) fn sub(x: &[Real], y: &[Real]) -> Vec<Real> {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(a, b)| a - b).collect()
}
