//! Implicit Euler (translates `impliciteulerscheme.hpp`).

use super::{require_step, start_step, FdmEvolver};
use crate::finite_differences::{
    axpy, boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite,
};
use ql_core::{errors::Result, Real, Size, Time};
use ql_math::BiCGStab;

/// Default relative tolerance of the Krylov solve.
pub const DEFAULT_REL_TOL: Real = 1e-8;

/// `(I - θ·dt·L) a_new = a`.
///
/// With one direction the system is tridiagonal and solved directly; with
/// more it is solved by preconditioned BiCGStab.
///
/// Corresponds to `QuantLib::ImplicitEulerScheme`.
#[derive(Debug)]
pub struct ImplicitEulerScheme<'a> {
    map: &'a mut dyn FdmLinearOpComposite,
    bc_set: &'a FdmBoundaryConditionSet,
    rel_tol: Real,
    dt: Option<Time>,
    iterations: Size,
}

impl<'a> ImplicitEulerScheme<'a> {
    /// Scheme over `map` with the default Krylov tolerance.
    pub fn new(map: &'a mut dyn FdmLinearOpComposite, bc_set: &'a FdmBoundaryConditionSet) -> Self {
        Self::with_rel_tol(map, bc_set, DEFAULT_REL_TOL)
    }

    /// Scheme over `map` with Krylov tolerance `rel_tol`.
    pub fn with_rel_tol(
        map: &'a mut dyn FdmLinearOpComposite,
        bc_set: &'a FdmBoundaryConditionSet,
        rel_tol: Real,
    ) -> Self {
        Self {
            map,
            bc_set,
            rel_tol,
            dt: None,
            iterations: 0,
        }
    }

    /// One step weighted by `theta`.
    pub fn step_with_theta(&mut self, a: &mut [Real], t: Time, theta: Real) -> Result<()> {
        let dt = require_step(self.dt)?;
        self.iterations += step(self.map, self.bc_set, a, t, dt, theta, self.rel_tol)?;
        Ok(())
    }

    /// BiCGStab iterations spent so far.
    pub fn number_of_iterations(&self) -> Size {
        self.iterations
    }
}

impl FdmEvolver for ImplicitEulerScheme<'_> {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        self.step_with_theta(a, t, 1.0)
    }
}

/// Solve `(I - c·L) x = rhs` for the whole operator, starting from `rhs`.
/// Returns the solution and the iterations spent.
pub(crate) fn solve_full(
    map: &dyn FdmLinearOpComposite,
    rhs: &[Real],
    c: Real,
    rel_tol: Real,
) -> Result<(Vec<Real>, Size)> {
    if map.size() == 1 {
        return Ok((map.solve_splitting(0, rhs, -c)?, 0));
    }
    let result = BiCGStab::new(rhs.len().max(10), rel_tol).solve_preconditioned(
        |x: &[Real]| {
            let mut y = x.to_vec();
            axpy(&mut y, -c, &map.apply(x));
            Ok(y)
        },
        |r: &[Real]| map.preconditioner(r, -c),
        rhs,
        rhs,
    )?;
    Ok((result.x, result.iterations))
}

pub(crate) fn step(
    map: &mut dyn FdmLinearOpComposite,
    bc_set: &FdmBoundaryConditionSet,
    a: &mut [Real],
    t: Time,
    dt: Time,
    theta: Real,
    rel_tol: Real,
) -> Result<Size> {
    start_step(map, bc_set, t, dt)?;
    bc_set.apply_before_solving(a);
    let (x, iterations) = solve_full(map, a, theta * dt, rel_tol)?;
    a.copy_from_slice(&x);
    bc_set.apply_after_solving(a);
    Ok(iterations)
}
