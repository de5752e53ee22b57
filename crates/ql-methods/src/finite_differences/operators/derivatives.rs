//! First and second derivative stencils on non-uniform grids
//! (translates `firstderivativeop.hpp` and `secondderivativeop.hpp`).

use super::TripleBandLinearOp;
use crate::finite_differences::meshers::FdmMesherComposite;
use ql_core::Size;
use std::ops::Deref;

/// Central first derivative `∂/∂x` along one direction, one-sided at the
/// grid ends.
///
/// With `hm = dminus`, `hp = dplus` the interior row is
/// `(-hp/(hm(hm+hp)), (hp-hm)/(hm·hp), hm/(hp(hm+hp)))`, exact for
/// quadratics on any spacing.
///
/// Corresponds to `QuantLib::FirstDerivativeOp`.
#[derive(Debug, Clone)]
pub struct FirstDerivativeOp(TripleBandLinearOp);

impl FirstDerivativeOp {
    /// The stencil along `direction`.
    pub fn new(direction: Size, mesher: &FdmMesherComposite) -> Self {
        let mut op = TripleBandLinearOp::new(direction, mesher);
        let last = mesher.layout().dim()[direction] - 1;

        for it in mesher.layout().iter() {
            let i = it.index;
            let hm = mesher.dminus(&it, direction);
            let hp = mesher.dplus(&it, direction);
            let co = it.coordinates[direction];

            if co == 0 {
                op.lower[i] = 0.0;
                op.upper[i] = 1.0 / hp;
                op.diag[i] = -op.upper[i];
            } else if co == last {
                op.diag[i] = 1.0 / hm;
                op.lower[i] = -op.diag[i];
                op.upper[i] = 0.0;
            } else {
                op.lower[i] = -hp / (hm * (hm + hp));
                op.diag[i] = (hp - hm) / (hm * hp);
                op.upper[i] = hm / (hp * (hm + hp));
            }
        }
        Self(op)
    }
}

/// Second derivative `∂²/∂x²` along one direction; the boundary rows are
/// zero.
///
/// Corresponds to `QuantLib::SecondDerivativeOp`.
#[derive(Debug, Clone)]
pub struct SecondDerivativeOp(TripleBandLinearOp);

impl SecondDerivativeOp {
    /// The stencil along `direction`.
    pub fn new(direction: Size, mesher: &FdmMesherComposite) -> Self {
        let mut op = TripleBandLinearOp::new(direction, mesher);
        let last = mesher.layout().dim()[direction] - 1;

        for it in mesher.layout().iter() {
            let i = it.index;
            let co = it.coordinates[direction];
            if co == 0 || co == last {
                continue;
            }
            let hm = mesher.dminus(&it, direction);
            let hp = mesher.dplus(&it, direction);
            op.lower[i] = 2.0 / (hm * (hm + hp));
            op.diag[i] = -2.0 / (hm * hp);
            op.upper[i] = 2.0 / (hp * (hm + hp));
        }
        Self(op)
    }
}

macro_rules! band_newtype {
    ($name:ident) => {
        impl Deref for $name {
            type Target = TripleBandLinearOp;

            fn deref(&self) -> &TripleBandLinearOp {
                &self.0
            }
        }

        impl From<$name> for TripleBandLinearOp {
            fn from(op: $name) -> Self {
                op.0
            }
        }
    };
}

band_newtype!(FirstDerivativeOp);
band_newtype!(SecondDerivativeOp);
