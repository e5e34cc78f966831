//! Fixed-installment (amortizing) loan schedules

use log::debug;
use serde::{Deserialize, Serialize};

use super::cashflows::{CashFlowVector, Schedule, ScheduleRow};
use super::{ensure_non_negative, ensure_positive};
use crate::error::{CatError, Result};

/// Parameters of a fixed-installment personal loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentParams {
    /// Amount lent
    pub principal: f64,

    /// Number of monthly installments
    pub term_months: u32,

    /// Annual nominal rate as a decimal (0.24 for 24%)
    pub annual_rate: f64,

    /// One-time opening fee, netted out of the disbursement
    #[serde(default)]
    pub opening_fee: f64,

    /// Fixed fee added to every installment
    #[serde(default)]
    pub monthly_fee: f64,

    /// Monthly insurance premium added to every installment
    #[serde(default)]
    pub insurance: f64,

    /// Any other one-time cost netted out of the disbursement
    #[serde(default)]
    pub other_initial_costs: f64,
}

impl InstallmentParams {
    /// Loan with no fees, insurance or other costs
    pub fn new(principal: f64, term_months: u32, annual_rate: f64) -> Self {
        Self {
            principal,
            term_months,
            annual_rate,
            opening_fee: 0.0,
            monthly_fee: 0.0,
            insurance: 0.0,
            other_initial_costs: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.term_months < 1 {
            return Err(CatError::invalid("term_months must be at least 1"));
        }
        ensure_positive("principal", self.principal)?;
        ensure_non_negative("annual_rate", self.annual_rate)?;
        ensure_non_negative("opening_fee", self.opening_fee)?;
        ensure_non_negative("monthly_fee", self.monthly_fee)?;
        ensure_non_negative("insurance", self.insurance)?;
        ensure_non_negative("other_initial_costs", self.other_initial_costs)?;
        Ok(())
    }

    /// Money the borrower actually receives at disbursement
    pub fn net_disbursement(&self) -> f64 {
        self.principal - self.opening_fee - self.other_initial_costs
    }

    /// Level payment covering principal and interest
    pub fn level_payment(&self) -> f64 {
        level_payment(self.principal, self.term_months, self.annual_rate / 12.0)
    }
}

/// Standard annuity payment; a zero periodic rate splits the principal evenly.
///
/// The discount factor is taken through `ln_1p`/`exp_m1` so that rates too
/// small to move `(1 + i)^n` away from 1.0 still give a finite payment.
pub fn level_payment(principal: f64, term_months: u32, monthly_rate: f64) -> f64 {
    let n = term_months as f64;
    if monthly_rate == 0.0 {
        return principal / n;
    }
    // 1 - (1 + i)^-n
    let annuity_factor = -(-n * monthly_rate.ln_1p()).exp_m1();
    if !(annuity_factor > 0.0 && annuity_factor.is_finite()) {
        return principal / n;
    }
    principal * monthly_rate / annuity_factor
}

/// Build the cash-flow schedule of a fixed-installment loan.
///
/// Index 0 carries the net disbursement and every later index one
/// installment plus the monthly fee and insurance.
pub fn installment_schedule(params: &InstallmentParams) -> Result<Schedule> {
    params.validate()?;

    let monthly_rate = params.annual_rate / 12.0;
    let payment = params.level_payment();
    let charges = params.monthly_fee + params.insurance;
    let total_payment = payment + charges;

    let mut flows = Vec::with_capacity(params.term_months as usize + 1);
    let mut rows = Vec::with_capacity(params.term_months as usize);

    flows.push(params.net_disbursement());

    let mut balance = params.principal;
    for period in 1..=params.term_months {
        let mut row = ScheduleRow::new(period);
        row.opening_balance = balance;
        row.interest = balance * monthly_rate;
        row.scheduled_payment = payment;
        row.charges = charges;
        row.total_payment = total_payment;

        balance = balance + row.interest - payment;
        row.closing_balance = if period == params.term_months { 0.0 } else { balance };

        flows.push(-total_payment);
        rows.push(row);
    }

    debug!(
        "Installment schedule: principal={} term={} payment={:.2} net_disbursement={:.2}",
        params.principal,
        params.term_months,
        total_payment,
        params.net_disbursement()
    );

    Ok(Schedule {
        flows: CashFlowVector::new(flows)?,
        rows,
    })
}
