//! Internal rate of return solving for periodic cash-flow vectors
//!
//! The default [`NewtonRaphsonSolver`] runs a damped Newton-Raphson iteration
//! and falls back to bisection over a configured bracket when Newton stalls.
//! Schedule generators only depend on the [`RateSolver`] trait.

mod irr;
mod npv;

pub use irr::NewtonRaphsonSolver;
pub use npv::{npv, npv_derivative};

use serde::{Deserialize, Serialize};

use crate::schedule::CashFlowVector;

/// Tuning knobs for the IRR solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Starting periodic rate (10% per month)
    pub initial_guess: f64,

    /// Convergence threshold on |NPV| and on the step size
    pub tolerance: f64,

    /// Maximum Newton iterations, also used as the bisection budget
    pub max_iterations: u32,

    /// Rate used when a Newton step lands at or below zero
    pub floor_reset: f64,

    /// Steps above this rate are pulled back to `cap_reset`
    pub rate_cap: f64,

    /// Rate substituted when a step exceeds `rate_cap`
    pub cap_reset: f64,

    /// Bisection fallback interval; `None` keeps the pure Newton behavior
    pub bracket: Option<(f64, f64)>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.10,
            tolerance: 1e-10,
            max_iterations: 1000,
            floor_reset: 0.001,
            rate_cap: 1.0,
            cap_reset: 0.9,
            bracket: Some((-0.5, 10.0)),
        }
    }
}

/// Which method produced the final rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    Newton,
    Bisection,
}

/// Periodic rate found by a solver, with convergence diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Periodic (monthly) rate as a decimal
    pub rate: f64,

    /// NPV of the flows at `rate`
    pub npv: f64,

    /// Total iterations spent, Newton and bisection combined
    pub iterations: u32,

    /// False when the budget ran out and `rate` is only the best estimate
    pub converged: bool,

    pub method: SolveMethod,
}

/// Solves `NPV(rate) = 0` for a validated cash-flow vector.
///
/// Non-convergence is reported through [`IrrSolution::converged`], never as
/// an error.
pub trait RateSolver {
    fn solve(&self, flows: &CashFlowVector) -> IrrSolution;
}

impl<S: RateSolver + ?Sized> RateSolver for &S {
    fn solve(&self, flows: &CashFlowVector) -> IrrSolution {
        (**self).solve(flows)
    }
}
