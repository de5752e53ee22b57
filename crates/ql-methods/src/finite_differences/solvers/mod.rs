//! Rollback drivers and the solvers built on them
//! (translates `ql/methods/finitedifferences/solvers/`).

pub mod backward_solver;
pub mod black_scholes_solver;
pub mod fdm_1dim_solver;
pub mod finite_difference_model;
pub mod solver_desc;

pub use backward_solver::FdmBackwardSolver;
pub use black_scholes_solver::FdmBlackScholesSolver;
pub use fdm_1dim_solver::Fdm1DimSolver;
pub use finite_difference_model::FiniteDifferenceModel;
pub use solver_desc::FdmSolverDesc;
