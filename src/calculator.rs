//! CAT calculation: build a schedule, solve its IRR and annualize it

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schedule::{
    auto_loan_schedule, installment_schedule, revolving_schedule, AutoLoanParams,
    CashFlowVector, InstallmentParams, RevolvingParams, Schedule,
};
use crate::solver::{NewtonRaphsonSolver, RateSolver, SolveMethod, SolverConfig};
use crate::tiers::{CardParams, TierTable};

/// Periods per year of every schedule
pub const PERIODS_PER_YEAR: f64 = 12.0;

/// Nominal annualization of a monthly rate, as a percentage
pub fn annualize(periodic_rate: f64) -> f64 {
    periodic_rate * PERIODS_PER_YEAR * 100.0
}

/// CAT of one credit with solver diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatResult {
    /// Annualized percentage (33.2 means 33.2%)
    pub cat_pct: f64,

    /// Monthly rate returned by the solver
    pub periodic_rate: f64,

    /// NPV of the schedule at `periodic_rate`
    pub residual_npv: f64,

    pub iterations: u32,

    pub converged: bool,

    pub method: SolveMethod,

    /// Length of the solved cash-flow vector
    pub periods: usize,
}

/// Composes the schedule generators with a rate solver.
///
/// # Example
/// ```
/// use cat_calculator::{CatCalculator, InstallmentParams};
///
/// let calculator: CatCalculator = CatCalculator::default();
/// let params = InstallmentParams {
///     opening_fee: 1000.0,
///     ..InstallmentParams::new(50_000.0, 24, 0.24)
/// };
/// let result = calculator.installment(&params).unwrap();
/// assert!(result.cat_pct > 24.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatCalculator<S = NewtonRaphsonSolver> {
    solver: S,
}

impl CatCalculator<NewtonRaphsonSolver> {
    /// Calculator using the Newton-Raphson solver with the given config
    pub fn with_config(config: SolverConfig) -> Self {
        Self::new(NewtonRaphsonSolver::new(config))
    }
}

impl<S: RateSolver> CatCalculator<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Solve any cash-flow vector and annualize the result
    pub fn solve(&self, flows: &CashFlowVector) -> CatResult {
        let solution = self.solver.solve(flows);

        if !solution.converged {
            warn!(
                "CAT computed from a non-converged rate (residual npv={:.3e})",
                solution.npv
            );
        }

        let result = CatResult {
            cat_pct: annualize(solution.rate),
            periodic_rate: solution.rate,
            residual_npv: solution.npv,
            iterations: solution.iterations,
            converged: solution.converged,
            method: solution.method,
            periods: flows.len(),
        };
        debug!("CAT {:.4}% over {} flows", result.cat_pct, result.periods);
        result
    }

    pub fn installment_schedule(&self, params: &InstallmentParams) -> Result<Schedule> {
        installment_schedule(params)
    }

    pub fn revolving_schedule(&self, params: &RevolvingParams) -> Result<Schedule> {
        revolving_schedule(params)
    }

    pub fn auto_loan_schedule(&self, params: &AutoLoanParams) -> Result<Schedule> {
        auto_loan_schedule(params)
    }

    pub fn card_schedule(&self, params: &CardParams, tiers: &TierTable) -> Result<Schedule> {
        revolving_schedule(&params.to_revolving(tiers))
    }

    pub fn installment(&self, params: &InstallmentParams) -> Result<CatResult> {
        Ok(self.solve(&installment_schedule(params)?.flows))
    }

    pub fn revolving(&self, params: &RevolvingParams) -> Result<CatResult> {
        Ok(self.solve(&revolving_schedule(params)?.flows))
    }

    pub fn auto_loan(&self, params: &AutoLoanParams) -> Result<CatResult> {
        Ok(self.solve(&auto_loan_schedule(params)?.flows))
    }

    pub fn card(&self, params: &CardParams, tiers: &TierTable) -> Result<CatResult> {
        Ok(self.solve(&self.card_schedule(params, tiers)?.flows))
    }
}

fn default_calculator() -> CatCalculator {
    CatCalculator::default()
}

/// CAT of a fixed-installment loan with the default solver
pub fn calculate_installment_apr(params: &InstallmentParams) -> Result<f64> {
    default_calculator().installment(params).map(|r| r.cat_pct)
}

/// CAT of a revolving line with the default solver
pub fn calculate_revolving_apr(params: &RevolvingParams) -> Result<f64> {
    default_calculator().revolving(params).map(|r| r.cat_pct)
}

/// CAT of an auto loan with the default solver
pub fn calculate_auto_loan_apr(params: &AutoLoanParams) -> Result<f64> {
    default_calculator().auto_loan(params).map(|r| r.cat_pct)
}

/// CAT of a credit card, with its line resolved through `tiers`
pub fn calculate_card_apr(params: &CardParams, tiers: &TierTable) -> Result<f64> {
    default_calculator().card(params, tiers).map(|r| r.cat_pct)
}
