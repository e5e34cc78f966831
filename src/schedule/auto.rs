//! Auto loans: fixed installments on the financed part of a vehicle price

use serde::{Deserialize, Serialize};

use super::cashflows::Schedule;
use super::ensure_non_negative;
use super::installment::{installment_schedule, InstallmentParams};
use crate::error::{CatError, Result};

/// Parameters of an auto loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoLoanParams {
    pub vehicle_price: f64,

    /// Paid up front by the borrower, not financed
    pub down_payment: f64,

    pub term_months: u32,

    /// Annual nominal rate as a decimal
    pub annual_rate: f64,

    #[serde(default)]
    pub opening_fee: f64,

    #[serde(default)]
    pub monthly_fee: f64,

    /// Monthly vehicle insurance
    #[serde(default)]
    pub auto_insurance: f64,

    /// Monthly life insurance
    #[serde(default)]
    pub life_insurance: f64,

    /// Monthly GPS tracking fee
    #[serde(default)]
    pub gps: f64,

    /// Plates, registration and other one-time costs
    #[serde(default)]
    pub other_initial_costs: f64,
}

impl AutoLoanParams {
    pub fn new(vehicle_price: f64, down_payment: f64, term_months: u32, annual_rate: f64) -> Self {
        Self {
            vehicle_price,
            down_payment,
            term_months,
            annual_rate,
            opening_fee: 0.0,
            monthly_fee: 0.0,
            auto_insurance: 0.0,
            life_insurance: 0.0,
            gps: 0.0,
            other_initial_costs: 0.0,
        }
    }

    pub fn financed_amount(&self) -> f64 {
        self.vehicle_price - self.down_payment
    }

    /// Equivalent installment loan: the financed amount with every monthly add-on folded into insurance
    pub fn to_installment(&self) -> Result<InstallmentParams> {
        ensure_non_negative("down_payment", self.down_payment)?;
        ensure_non_negative("auto_insurance", self.auto_insurance)?;
        ensure_non_negative("life_insurance", self.life_insurance)?;
        ensure_non_negative("gps", self.gps)?;
        if self.down_payment >= self.vehicle_price {
            return Err(CatError::invalid(format!(
                "down_payment {} must be below vehicle_price {}",
                self.down_payment, self.vehicle_price
            )));
        }

        Ok(InstallmentParams {
            principal: self.financed_amount(),
            term_months: self.term_months,
            annual_rate: self.annual_rate,
            opening_fee: self.opening_fee,
            monthly_fee: self.monthly_fee,
            insurance: self.auto_insurance + self.life_insurance + self.gps,
            other_initial_costs: self.other_initial_costs,
        })
    }
}

pub fn auto_loan_schedule(params: &AutoLoanParams) -> Result<Schedule> {
    installment_schedule(&params.to_installment()?)
}
