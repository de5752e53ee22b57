//! Time-integration schemes (translates `ql/methods/finitedifferences/schemes/`).
//!
//! Every scheme rolls the solution one step back in time, from `t` to
//! `max(0, t - dt)`, through the [`FdmEvolver`] interface. The operator is
//! re-timed to the step at its start. The multi-direction schemes are
//! ADI-type splittings built on the same Douglas predictor
//!
//! ```text
//! y  = a + dt·L a
//! y  = (I - θ·dt·L_i)⁻¹ (y - θ·dt·L_i a)      for each direction i
//! ```
//!
//! and differ in their corrector stage.

pub mod crank_nicolson;
pub mod craig_sneyd;
pub mod douglas;
pub mod explicit_euler;
pub mod hundsdorfer;
pub mod implicit_euler;
pub mod method_of_lines;
pub mod modified_craig_sneyd;
pub mod trbdf2;

pub use crank_nicolson::CrankNicolsonScheme;
pub use craig_sneyd::CraigSneydScheme;
pub use douglas::DouglasScheme;
pub use explicit_euler::ExplicitEulerScheme;
pub use hundsdorfer::HundsdorferScheme;
pub use implicit_euler::ImplicitEulerScheme;
pub use method_of_lines::MethodOfLinesScheme;
pub use modified_craig_sneyd::ModifiedCraigSneydScheme;
pub use trbdf2::TrBDF2Scheme;

use super::{
    axpy, boundary_conditions::FdmBoundaryConditionSet, operators::FdmLinearOpComposite,
};
use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use std::fmt;

/// A scheme that rolls a solution back by one time step.
///
/// Corresponds to the evolver concept of `QuantLib::FiniteDifferenceModel`.
pub trait FdmEvolver {
    /// Set the step used by subsequent calls to [`step`](Self::step).
    fn set_step(&mut self, dt: Time);

    /// Replace `a`, the solution at `t`, by the solution at `t - dt`.
    ///
    /// # Errors
    /// `Precondition` if no step was set or the step would cross zero, and
    /// any error of the linear solves.
    fn step(&mut self, a: &mut [Real], t: Time) -> Result<()>;
}

/// The available schemes.
///
/// Corresponds to `QuantLib::FdmSchemeDesc::FdmSchemeType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmSchemeType {
    /// [`HundsdorferScheme`].
    Hundsdorfer,
    /// [`DouglasScheme`].
    Douglas,
    /// [`CraigSneydScheme`].
    CraigSneyd,
    /// [`ModifiedCraigSneydScheme`].
    ModifiedCraigSneyd,
    /// [`ImplicitEulerScheme`].
    ImplicitEuler,
    /// [`ExplicitEulerScheme`].
    ExplicitEuler,
    /// [`MethodOfLinesScheme`].
    MethodOfLines,
    /// [`TrBDF2Scheme`].
    TrBDF2,
    /// [`CrankNicolsonScheme`].
    CrankNicolson,
}

impl fmt::Display for FdmSchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hundsdorfer => "Hundsdorfer",
            Self::Douglas => "Douglas",
            Self::CraigSneyd => "CraigSneyd",
            Self::ModifiedCraigSneyd => "ModifiedCraigSneyd",
            Self::ImplicitEuler => "ImplicitEuler",
            Self::ExplicitEuler => "ExplicitEuler",
            Self::MethodOfLines => "MethodOfLines",
            Self::TrBDF2 => "TrBDF2",
            Self::CrankNicolson => "CrankNicolson",
        };
        f.write_str(name)
    }
}

/// A scheme and its two parameters.
///
/// `theta` and `mu` mean different things per scheme: for
/// [`FdmSchemeType::MethodOfLines`] they are the ODE tolerance and the
/// initial step relative to `dt`, for [`FdmSchemeType::TrBDF2`] the
/// intermediate step fraction α and the Krylov tolerance.
///
/// Corresponds to `QuantLib::FdmSchemeDesc`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdmSchemeDesc {
    /// Which scheme.
    pub scheme_type: FdmSchemeType,
    /// Implicitness (or the first scheme-specific parameter).
    pub theta: Real,
    /// Corrector weight (or the second scheme-specific parameter).
    pub mu: Real,
}

impl FdmSchemeDesc {
    /// A descriptor with explicit parameters.
    pub fn new(scheme_type: FdmSchemeType, theta: Real, mu: Real) -> Self {
        Self {
            scheme_type,
            theta,
            mu,
        }
    }

    /// Douglas, θ = 1/2.
    pub fn douglas() -> Self {
        Self::new(FdmSchemeType::Douglas, 0.5, 0.0)
    }

    /// Crank-Nicolson, θ = 1/2.
    pub fn crank_nicolson() -> Self {
        Self::new(FdmSchemeType::CrankNicolson, 0.5, 0.0)
    }

    /// Fully implicit Euler.
    pub fn implicit_euler() -> Self {
        Self::new(FdmSchemeType::ImplicitEuler, 0.0, 0.0)
    }

    /// Explicit Euler.
    pub fn explicit_euler() -> Self {
        Self::new(FdmSchemeType::ExplicitEuler, 0.0, 0.0)
    }

    /// Craig-Sneyd, θ = μ = 1/2.
    pub fn craig_sneyd() -> Self {
        Self::new(FdmSchemeType::CraigSneyd, 0.5, 0.5)
    }

    /// Modified Craig-Sneyd, θ = μ = 1/3.
    pub fn modified_craig_sneyd() -> Self {
        Self::new(FdmSchemeType::ModifiedCraigSneyd, 1.0 / 3.0, 1.0 / 3.0)
    }

    /// Hundsdorfer, θ = 1/2 + √3/6, μ = 1/2.
    pub fn hundsdorfer() -> Self {
        Self::new(FdmSchemeType::Hundsdorfer, 0.5 + 3f64.sqrt() / 6.0, 0.5)
    }

    /// Hundsdorfer with θ = 1 - √2/2.
    pub fn modified_hundsdorfer() -> Self {
        Self::new(FdmSchemeType::Hundsdorfer, 1.0 - 2f64.sqrt() / 2.0, 0.5)
    }

    /// Method of lines with ODE tolerance `eps` and initial step
    /// `rel_init_step·dt` (QuantLib uses 0.001 and 0.1).
    pub fn method_of_lines(eps: Real, rel_init_step: Real) -> Self {
        Self::new(FdmSchemeType::MethodOfLines, eps, rel_init_step)
    }

    /// TR-BDF2 with α = 2 - √2 and Krylov tolerance 1e-8.
    pub fn trbdf2() -> Self {
        Self::new(FdmSchemeType::TrBDF2, 2.0 - 2f64.sqrt(), 1e-8)
    }
}

impl Default for FdmSchemeDesc {
    fn default() -> Self {
        Self::douglas()
    }
}

// ── Shared step plumbing ─────────────────────────────────────────────────────

/// Maximum step overshoot below zero tolerated by every scheme.
const NEGATIVE_TIME_TOLERANCE: Time = 1e-8;

pub(crate) fn require_step(dt: Option<Time>) -> Result<Time> {
    dt.ok_or_else(|| Error::Precondition("time step not set".to_string()))
}

/// Check the step and re-time the operator and the boundary conditions to
/// `[max(0, t - dt), t]`.
pub(crate) fn start_step(
    map: &mut dyn FdmLinearOpComposite,
    bc_set: &FdmBoundaryConditionSet,
    t: Time,
    dt: Time,
) -> Result<Time> {
    ql_core::ensure!(
        t - dt > -NEGATIVE_TIME_TOLERANCE,
        "a step towards negative time was given (t = {t}, dt = {dt})"
    );
    let start = (t - dt).max(0.0);
    map.set_time(start, t);
    bc_set.set_time(start);
    Ok(start)
}

/// `y = solve_i(y - θ·dt·L_i base, -θ·dt)` for each direction in turn.
pub(crate) fn directional_solves(
    map: &dyn FdmLinearOpComposite,
    mut y: Vec<Real>,
    base: &[Real],
    theta: Real,
    dt: Time,
) -> Result<Vec<Real>> {
    for i in 0..map.size() {
        axpy(&mut y, -theta * dt, &map.apply_direction(i, base));
        y = map.solve_splitting(i, &y, -theta * dt)?;
    }
    Ok(y)
}

/// The explicit predictor `y0 = a + dt·L a` (boundary restored) and the
/// Douglas stage built on it. Returns `(y0, y)`.
pub(crate) fn douglas_predictor(
    map: &dyn FdmLinearOpComposite,
    bc_set: &FdmBoundaryConditionSet,
    a: &[Real],
    theta: Real,
    dt: Time,
) -> Result<(Vec<Real>, Vec<Real>)> {
    let mut y0 = a.to_vec();
    axpy(&mut y0, dt, &map.apply(a));
    bc_set.apply_after_applying(&mut y0);

    let y = directional_solves(map, y0.clone(), a, theta, dt)?;
    Ok((y0, y))
}
