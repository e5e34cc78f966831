//! CAT Calculator - Total Annual Cost for consumer credit products
//!
//! This library provides:
//! - Cash-flow schedules for fixed-installment loans, auto loans and revolving lines
//! - An IRR solver (damped Newton-Raphson with bisection fallback)
//! - Card tier tables mapping card categories to standardized credit lines
//! - CAT entry points returning the nominal annualized percentage

pub mod error;
pub mod schedule;
pub mod solver;
pub mod tiers;
pub mod calculator;

// Re-export commonly used types
pub use error::{CatError, Result};
pub use schedule::{
    AutoLoanParams, CashFlowVector, InstallmentParams, RedrawTiming, RevolvingParams, Schedule,
    ScheduleRow,
};
pub use solver::{IrrSolution, NewtonRaphsonSolver, RateSolver, SolveMethod, SolverConfig};
pub use tiers::{CardParams, CardTier, TierTable};
pub use calculator::{
    annualize, calculate_auto_loan_apr, calculate_card_apr, calculate_installment_apr,
    calculate_revolving_apr, CatCalculator, CatResult,
};
