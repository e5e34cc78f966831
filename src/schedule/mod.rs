//! Cash-flow schedule generators for each credit product

mod auto;
mod cashflows;
mod installment;
mod revolving;
mod state;

pub use auto::{auto_loan_schedule, AutoLoanParams};
pub use cashflows::{CashFlowVector, Schedule, ScheduleRow, ScheduleSummary};
pub use installment::{installment_schedule, level_payment, InstallmentParams};
pub use revolving::{
    revolving_schedule, RedrawTiming, RevolvingParams, DEFAULT_MIN_PAYMENT_FRACTION,
    MIN_PAYMENT_FLOOR, REVOLVING_TERM_MONTHS,
};

use crate::error::{CatError, Result};

fn ensure_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CatError::invalid(format!("{} must be positive, got {}", field, value)))
    }
}

fn ensure_non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CatError::invalid(format!("{} must be non-negative, got {}", field, value)))
    }
}
