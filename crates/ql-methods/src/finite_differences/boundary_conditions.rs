//! Dirichlet and Neumann boundary conditions
//! (translates `ql/methods/finitedifferences/boundarycondition.hpp` and
//! `fdmdirichletboundary.hpp`).
//!
//! A condition acts at one end of a grid line. On a [`TridiagonalOperator`]
//! it rewrites the first or last row; on a full N-D array the
//! [`FdmBoundaryConditionSet`] resolves every boundary point of a direction
//! once and overwrites those entries around each scheme sub-step.

use crate::finite_differences::{meshers::FdmMesherComposite, operators::TridiagonalOperator};
use ql_core::{errors::Result, Real, Size, Time};

/// End of a grid line a condition acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundarySide {
    /// The first node (smallest location).
    Lower,
    /// The last node (largest location).
    Upper,
}

/// A boundary condition on one side of a grid line.
///
/// Corresponds to `QuantLib::DirichletBC` and `QuantLib::NeumannBC`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FdmBoundaryCondition {
    /// The function value is fixed.
    Dirichlet {
        /// Which end.
        side: BoundarySide,
        /// Value imposed at that end.
        value: Real,
    },
    /// The first difference towards the boundary is fixed: `u[1] - u[0]` on
    /// the lower side, `u[n-1] - u[n-2]` on the upper side.
    Neumann {
        /// Which end.
        side: BoundarySide,
        /// Difference imposed at that end.
        value: Real,
    },
}

impl FdmBoundaryCondition {
    /// Dirichlet condition `u = value` on `side`.
    pub fn dirichlet(side: BoundarySide, value: Real) -> Self {
        Self::Dirichlet { side, value }
    }

    /// Neumann condition with first difference `value` on `side`.
    pub fn neumann(side: BoundarySide, value: Real) -> Self {
        Self::Neumann { side, value }
    }

    /// Side the condition acts on.
    pub fn side(&self) -> BoundarySide {
        match *self {
            Self::Dirichlet { side, .. } | Self::Neumann { side, .. } => side,
        }
    }

    /// The imposed value or difference.
    pub fn value(&self) -> Real {
        match *self {
            Self::Dirichlet { value, .. } | Self::Neumann { value, .. } => value,
        }
    }

    /// Conditions here are constant in time.
    pub fn set_time(&mut self, _t: Time) {}

    fn set_boundary_row(&self, op: &mut TridiagonalOperator) {
        match (self, self.side()) {
            (Self::Dirichlet { .. }, BoundarySide::Lower) => op.set_first_row(1.0, 0.0),
            (Self::Dirichlet { .. }, BoundarySide::Upper) => op.set_last_row(0.0, 1.0),
            (Self::Neumann { .. }, BoundarySide::Lower) => op.set_first_row(-1.0, 1.0),
            (Self::Neumann { .. }, BoundarySide::Upper) => op.set_last_row(-1.0, 1.0),
        }
    }

    /// Rewrite the boundary row before the operator is applied.
    pub fn apply_before_applying(&self, op: &mut TridiagonalOperator) {
        self.set_boundary_row(op);
    }

    /// Restore the boundary entry of an array the operator was applied to.
    pub fn apply_after_applying(&self, u: &mut [Real]) {
        let n = u.len();
        match (*self, self.side()) {
            (Self::Dirichlet { value, .. }, BoundarySide::Lower) => u[0] = value,
            (Self::Dirichlet { value, .. }, BoundarySide::Upper) => u[n - 1] = value,
            (Self::Neumann { value, .. }, BoundarySide::Lower) => u[0] = u[1] - value,
            (Self::Neumann { value, .. }, BoundarySide::Upper) => u[n - 1] = u[n - 2] + value,
        }
    }

    /// Rewrite the boundary row and right-hand side before solving
    /// `op · x = rhs`.
    pub fn apply_before_solving(&self, op: &mut TridiagonalOperator, rhs: &mut [Real]) {
        self.set_boundary_row(op);
        let end = match self.side() {
            BoundarySide::Lower => 0,
            BoundarySide::Upper => rhs.len() - 1,
        };
        rhs[end] = self.value();
    }

    /// Enforce the condition on a solution.
    ///
    /// A no-op after a solve prepared with
    /// [`apply_before_solving`](Self::apply_before_solving); needed when the
    /// rows were not rewritten, as in the N-D schemes.
    pub fn apply_after_solving(&self, u: &mut [Real]) {
        self.apply_after_applying(u);
    }
}

#[derive(Debug, Clone)]
struct ResolvedCondition {
    condition: FdmBoundaryCondition,
    indices: Vec<Size>,
    neighbours: Vec<Size>,
}

impl ResolvedCondition {
    fn overwrite(&self, a: &mut [Real]) {
        for (&i, &nb) in self.indices.iter().zip(&self.neighbours) {
            a[i] = match self.condition {
                FdmBoundaryCondition::Dirichlet { value, .. } => value,
                FdmBoundaryCondition::Neumann { side, value } => match side {
                    BoundarySide::Lower => a[nb] - value,
                    BoundarySide::Upper => a[nb] + value,
                },
            };
        }
    }
}

/// The boundary conditions of a solve, each attached to one direction of the
/// mesher and resolved to the flat indices of its boundary points.
///
/// Corresponds to `QuantLib::FdmBoundaryConditionSet`.
#[derive(Debug, Clone, Default)]
pub struct FdmBoundaryConditionSet {
    conditions: Vec<ResolvedCondition>,
}

impl FdmBoundaryConditionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `condition` to `direction` of `mesher`.
    ///
    /// # Errors
    /// `Precondition` if the mesher has no such direction.
    pub fn push(
        &mut self,
        condition: FdmBoundaryCondition,
        direction: Size,
        mesher: &FdmMesherComposite,
    ) -> Result<()> {
        let layout = mesher.layout();
        ql_core::ensure!(
            direction < layout.dim().len(),
            "direction {direction} out of range for a {}-dimensional mesher",
            layout.dim().len()
        );

        let last = layout.dim()[direction] - 1;
        let (target, offset) = match condition.side() {
            BoundarySide::Lower => (0, 1),
            BoundarySide::Upper => (last, -1),
        };

        let (indices, neighbours): (Vec<Size>, Vec<Size>) = layout
            .iter()
            .filter(|it| it.coordinates[direction] == target)
            .map(|it| {
                let nb = layout.neighbourhood(it.index, &it.coordinates, direction, offset);
                (it.index, nb)
            })
            .unzip();

        self.conditions.push(ResolvedCondition {
            condition,
            indices,
            neighbours,
        });
        Ok(())
    }

    /// Number of conditions.
    pub fn len(&self) -> Size {
        self.conditions.len()
    }

    /// `true` if the set holds no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Conditions here are constant in time.
    pub fn set_time(&self, _t: Time) {}

    /// Restore boundary entries after an explicit application.
    pub fn apply_after_applying(&self, a: &mut [Real]) {
        for c in &self.conditions {
            c.overwrite(a);
        }
    }

    /// Impose Dirichlet values on the right-hand side of an implicit solve.
    pub fn apply_before_solving(&self, a: &mut [Real]) {
        for c in &self.conditions {
            if let FdmBoundaryCondition::Dirichlet { .. } = c.condition {
                c.overwrite(a);
            }
        }
    }

    /// Enforce all conditions on the solution of an implicit solve.
    pub fn apply_after_solving(&self, a: &mut [Real]) {
        for c in &self.conditions {
            c.overwrite(a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, Uniform1dMesher};
    use approx::assert_abs_diff_eq;

    fn heat_step(n: usize, dt: Real) -> TridiagonalOperator {
        // I - dt·Dxx on a unit-spaced grid
        let mut op = TridiagonalOperator::new(n);
        op.set_first_row(1.0 + 2.0 * dt, -dt);
        op.set_mid_rows(-dt, 1.0 + 2.0 * dt, -dt);
        op.set_last_row(-dt, 1.0 + 2.0 * dt);
        op
    }

    #[test]
    fn dirichlet_pins_the_solution() {
        let mut op = heat_step(10, 0.5);
        let mut rhs = vec![1.0; 10];
        let lower = FdmBoundaryCondition::dirichlet(BoundarySide::Lower, 3.0);
        let upper = FdmBoundaryCondition::dirichlet(BoundarySide::Upper, -1.0);
        lower.apply_before_solving(&mut op, &mut rhs);
        upper.apply_before_solving(&mut op, &mut rhs);

        let mut x = op.solve_for(&rhs).unwrap();
        assert_abs_diff_eq!(x[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[9], -1.0, epsilon = 1e-12);

        let before = x.clone();
        lower.apply_after_solving(&mut x);
        upper.apply_after_solving(&mut x);
        assert_eq!(x[1..9], before[1..9]);
    }

    #[test]
    fn neumann_fixes_the_end_differences() {
        let mut op = heat_step(8, 0.25);
        let mut rhs: Vec<Real> = (0..8).map(|i| i as Real).collect();
        let lower = FdmBoundaryCondition::neumann(BoundarySide::Lower, 0.5);
        let upper = FdmBoundaryCondition::neumann(BoundarySide::Upper, 2.0);
        lower.apply_before_solving(&mut op, &mut rhs);
        upper.apply_before_solving(&mut op, &mut rhs);

        let x = op.solve_for(&rhs).unwrap();
        assert_abs_diff_eq!(x[1] - x[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(x[7] - x[6], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn after_applying_restores_the_ends() {
        let mut u = vec![5.0, 4.0, 3.0, 2.0];
        FdmBoundaryCondition::neumann(BoundarySide::Lower, 1.0).apply_after_applying(&mut u);
        FdmBoundaryCondition::dirichlet(BoundarySide::Upper, 0.0).apply_after_applying(&mut u);
        assert_eq!(u, vec![3.0, 4.0, 3.0, 0.0]);

        let mut op = TridiagonalOperator::identity(4);
        FdmBoundaryCondition::neumann(BoundarySide::Upper, 1.0).apply_before_applying(&mut op);
        assert_eq!((op.lower[3], op.diag[3]), (-1.0, 1.0));
    }

    #[test]
    fn set_resolves_boundary_points_of_a_direction() {
        let mesher = FdmMesherComposite::new(vec![
            Uniform1dMesher::new(0.0, 1.0, 3).unwrap().into(),
            Fdm1dMesher::from_locations(vec![0.0, 1.0, 2.0, 3.0]).unwrap(),
        ])
        .unwrap();

        let mut set = FdmBoundaryConditionSet::new();
        assert!(set.is_empty());
        set.push(FdmBoundaryCondition::dirichlet(BoundarySide::Upper, 7.0), 1, &mesher)
            .unwrap();
        set.push(FdmBoundaryCondition::neumann(BoundarySide::Lower, 1.0), 0, &mesher)
            .unwrap();
        assert_eq!(set.len(), 2);
        assert!(set
            .push(FdmBoundaryCondition::dirichlet(BoundarySide::Lower, 0.0), 2, &mesher)
            .is_err());

        let mut a: Vec<Real> = (0..12).map(|i| i as Real).collect();
        set.apply_before_solving(&mut a);
        // direction 1 spans strides of 3; its last line starts at index 9
        assert_eq!(a[9..12], [7.0, 7.0, 7.0]);
        assert_eq!(a[0], 0.0);

        set.apply_after_solving(&mut a);
        for line in 0..4 {
            let i = 3 * line;
            assert_abs_diff_eq!(a[i + 1] - a[i], 1.0);
        }
    }
}
