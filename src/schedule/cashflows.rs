//! Cash-flow vectors and per-period schedule output

use serde::{Deserialize, Serialize};

use crate::error::{CatError, Result};

/// Ordered borrower cash flows, one entry per discounting index.
///
/// Index 0 is the disbursement instant and index `k` is discounted by
/// `(1 + rate)^k`. Positive amounts go to the borrower, negative amounts are
/// paid by the borrower.
///
/// A vector always holds at least two finite entries of opposite sign, so an
/// internal rate of return can exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowVector {
    flows: Vec<f64>,
}

impl CashFlowVector {
    /// Validate and wrap a sequence of flows
    pub fn new(flows: Vec<f64>) -> Result<Self> {
        if flows.len() < 2 {
            return Err(CatError::invalid(format!(
                "cash-flow vector needs at least 2 entries, got {}",
                flows.len()
            )));
        }

        if let Some((idx, cf)) = flows.iter().enumerate().find(|(_, cf)| !cf.is_finite()) {
            return Err(CatError::invalid(format!(
                "cash flow at index {} is not finite ({})",
                idx, cf
            )));
        }

        let has_positive = flows.iter().any(|&cf| cf > 0.0);
        let has_negative = flows.iter().any(|&cf| cf < 0.0);
        if !has_positive || !has_negative {
            return Err(CatError::invalid(
                "cash-flow vector has no sign change, no rate of return exists",
            ));
        }

        Ok(Self { flows })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Always false: a valid vector holds at least two entries
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.flows.iter()
    }

    /// Sum of positive entries (money received by the borrower)
    pub fn total_disbursed(&self) -> f64 {
        self.flows.iter().filter(|&&cf| cf > 0.0).sum()
    }

    /// Sum of negative entries as a positive amount (money paid by the borrower)
    pub fn total_paid(&self) -> f64 {
        -self.flows.iter().filter(|&&cf| cf < 0.0).sum::<f64>()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.flows
    }
}

impl TryFrom<Vec<f64>> for CashFlowVector {
    type Error = CatError;

    fn try_from(flows: Vec<f64>) -> Result<Self> {
        Self::new(flows)
    }
}

impl AsRef<[f64]> for CashFlowVector {
    fn as_ref(&self) -> &[f64] {
        &self.flows
    }
}

/// One month of a generated schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Period number (1-indexed)
    pub period: u32,

    /// Outstanding balance at the start of the period
    pub opening_balance: f64,

    /// Interest accrued during the period
    pub interest: f64,

    /// Level installment or minimum payment due
    pub scheduled_payment: f64,

    /// Monthly fees, insurance and other charges
    pub charges: f64,

    /// Annual fee charged this period (revolving only)
    pub annual_fee: f64,

    /// Everything the borrower pays this period
    pub total_payment: f64,

    /// Amount re-drawn at period end (revolving only)
    pub redraw: f64,

    /// Outstanding balance at the end of the period
    pub closing_balance: f64,
}

impl ScheduleRow {
    pub fn new(period: u32) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }
}

/// Generated schedule: the flows handed to the solver plus the monthly breakdown
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub flows: CashFlowVector,
    pub rows: Vec<ScheduleRow>,
}

impl Schedule {
    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let total_interest: f64 = self.rows.iter().map(|r| r.interest).sum();
        let total_charges: f64 = self.rows.iter().map(|r| r.charges + r.annual_fee).sum();
        let total_redrawn: f64 = self.rows.iter().map(|r| r.redraw).sum();

        ScheduleSummary {
            periods: self.rows.len() as u32,
            flow_count: self.flows.len(),
            initial_disbursement: self.flows.as_slice()[0],
            total_disbursed: self.flows.total_disbursed(),
            total_paid: self.flows.total_paid(),
            total_interest,
            total_charges,
            total_redrawn,
            final_balance: self.rows.last().map(|r| r.closing_balance).unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub periods: u32,
    pub flow_count: usize,
    pub initial_disbursement: f64,
    pub total_disbursed: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub total_charges: f64,
    pub total_redrawn: f64,
    pub final_balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_vector() {
        assert!(matches!(
            CashFlowVector::new(vec![100.0]),
            Err(CatError::InvalidSchedule(_))
        ));
        assert!(CashFlowVector::new(Vec::new()).is_err());
    }

    #[test]
    fn test_rejects_single_sign() {
        assert!(CashFlowVector::new(vec![100.0, 50.0, 0.0]).is_err());
        assert!(CashFlowVector::new(vec![-100.0, -50.0]).is_err());
        assert!(CashFlowVector::new(vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(CashFlowVector::new(vec![100.0, f64::NAN]).is_err());
        assert!(CashFlowVector::new(vec![f64::INFINITY, -1.0]).is_err());
    }

    #[test]
    fn test_totals() {
        let flows = CashFlowVector::new(vec![1000.0, -600.0, 50.0, -500.0]).unwrap();
        assert_eq!(flows.len(), 4);
        assert_eq!(flows.total_disbursed(), 1050.0);
        assert_eq!(flows.total_paid(), 1100.0);
    }
}
