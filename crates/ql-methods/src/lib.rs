//! # ql-methods
//!
//! The finite-difference rollback framework.
//!
//! Translates `ql/methods/finitedifferences/`: non-uniform meshers, band
//! operators over a strided multi-dimensional layout, boundary and step
//! conditions, operator-splitting time schemes, and the backward solver that
//! lands exactly on every stopping time.
//!
//! # Modules
//!
//! * [`finite_differences::meshers`]: uniform, concentrating and Black-Scholes grids
//! * [`finite_differences::operators`]: layout, triple-band and tridiagonal operators
//! * [`finite_differences::step_conditions`]: American, Bermudan, dividend, snapshot
//! * [`finite_differences::schemes`]: Douglas, Craig-Sneyd, Hundsdorfer, TR-BDF2, ...
//! * [`finite_differences::solvers`]: rollback model, backward solver, 1-D solvers

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Finite difference methods for PDE-based option pricing.
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{
    boundary_conditions::{BoundarySide, FdmBoundaryCondition, FdmBoundaryConditionSet},
    meshers::{
        Concentrating1dMesher, Fdm1dMesher, FdmBlackScholesMesher, FdmMesherComposite,
        Uniform1dMesher,
    },
    operators::{
        FdmBlackScholesOp, FdmLinearOpComposite, FdmLinearOpIterator, FdmLinearOpLayout,
        FirstDerivativeOp, SecondDerivativeOp, TridiagonalOperator, TripleBandLinearOp,
    },
    schemes::{
        CraigSneydScheme, CrankNicolsonScheme, DouglasScheme, ExplicitEulerScheme, FdmEvolver,
        FdmSchemeDesc, FdmSchemeType, HundsdorferScheme, ImplicitEulerScheme, MethodOfLinesScheme,
        ModifiedCraigSneydScheme, TrBDF2Scheme,
    },
    solvers::{
        Fdm1DimSolver, FdmBackwardSolver, FdmBlackScholesSolver, FdmSolverDesc,
        FiniteDifferenceModel,
    },
    step_conditions::{
        FdmAmericanStepCondition, FdmBermudanStepCondition, FdmDividendHandler,
        FdmSnapshotCondition, FdmStepCondition, FdmStepConditionComposite,
    },
    utilities::{
        EscrowedDividendAdjustment, FdmCellAveragingInnerValue, FdmEscrowedLogInnerValue,
        FdmInnerValueCalculator, FdmLogInnerValue, FdmQuantoHelper, FdmZeroInnerValue,
    },
};
