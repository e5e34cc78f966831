//! Revolving credit line schedules under the minimum-payment assumption
//!
//! The borrower draws the full line at period 0, pays only the minimum every
//! month for 36 months, immediately re-draws whatever principal the minimum
//! payment retired, and pays off the remaining balance in the last month.

use log::debug;
use serde::{Deserialize, Serialize};

use super::cashflows::{CashFlowVector, Schedule, ScheduleRow};
use super::state::BalanceState;
use super::{ensure_non_negative, ensure_positive};
use crate::error::{CatError, Result};

/// Regulatory horizon of the revolving simulation
pub const REVOLVING_TERM_MONTHS: u32 = 36;

/// Floor on the monthly minimum payment, in currency units
pub const MIN_PAYMENT_FLOOR: f64 = 100.0;

/// Default minimum-payment fraction of the outstanding balance
pub const DEFAULT_MIN_PAYMENT_FRACTION: f64 = 0.05;

fn default_min_payment_fraction() -> f64 {
    DEFAULT_MIN_PAYMENT_FRACTION
}

/// Where a re-draw lands in the cash-flow vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedrawTiming {
    /// Netted against the payment at the same period index
    #[default]
    SamePeriod,
    /// Emitted as its own entry right after the payment, taking the next index
    Interleaved,
}

/// Parameters of a revolving credit line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevolvingParams {
    /// Credit line, drawn in full at period 0
    pub line_amount: f64,

    /// Annual nominal rate as a decimal
    pub annual_rate: f64,

    /// Membership fee charged every 12th period
    #[serde(default)]
    pub annual_fee: f64,

    /// Minimum payment as a fraction of the balance, in (0, 1]
    #[serde(default = "default_min_payment_fraction")]
    pub min_payment_fraction: f64,

    /// Fixed charges added to every monthly payment
    #[serde(default)]
    pub other_monthly_charges: f64,

    #[serde(default)]
    pub redraw_timing: RedrawTiming,
}

impl RevolvingParams {
    /// Line with no fees and the default 5% minimum payment
    pub fn new(line_amount: f64, annual_rate: f64) -> Self {
        Self {
            line_amount,
            annual_rate,
            annual_fee: 0.0,
            min_payment_fraction: DEFAULT_MIN_PAYMENT_FRACTION,
            other_monthly_charges: 0.0,
            redraw_timing: RedrawTiming::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("line_amount", self.line_amount)?;
        ensure_non_negative("annual_rate", self.annual_rate)?;
        ensure_non_negative("annual_fee", self.annual_fee)?;
        ensure_non_negative("other_monthly_charges", self.other_monthly_charges)?;

        let m = self.min_payment_fraction;
        if !(m > 0.0 && m <= 1.0) {
            return Err(CatError::invalid(format!(
                "min_payment_fraction must be in (0, 1], got {}",
                m
            )));
        }
        Ok(())
    }
}

/// Simulate 36 months of minimum payments and build the resulting schedule.
///
/// The closing balance of the final period is exactly zero.
pub fn revolving_schedule(params: &RevolvingParams) -> Result<Schedule> {
    params.validate()?;

    let monthly_rate = params.annual_rate / 12.0;
    let mut state = BalanceState::drawn(params.line_amount);

    let mut flows = Vec::with_capacity(2 * REVOLVING_TERM_MONTHS as usize + 1);
    let mut rows = Vec::with_capacity(REVOLVING_TERM_MONTHS as usize);

    flows.push(params.line_amount);

    for _ in 1..=REVOLVING_TERM_MONTHS {
        state.advance_month();
        let period = state.period;

        let mut row = ScheduleRow::new(period);
        row.opening_balance = state.balance;
        row.interest = state.balance * monthly_rate;
        row.scheduled_payment = (state.balance * params.min_payment_fraction).max(MIN_PAYMENT_FLOOR);
        row.charges = params.other_monthly_charges;
        row.annual_fee = if period % 12 == 0 { params.annual_fee } else { 0.0 };
        row.total_payment = row.scheduled_payment + row.charges + row.annual_fee;

        if period == REVOLVING_TERM_MONTHS {
            // Full payoff, nothing re-drawn
            state.settle(row.interest, row.scheduled_payment, 0.0);
            row.total_payment += state.pay_off();
        } else {
            row.redraw = (row.scheduled_payment - row.interest).max(0.0);
            state.settle(row.interest, row.scheduled_payment, row.redraw);
        }
        row.closing_balance = state.balance;

        match params.redraw_timing {
            RedrawTiming::SamePeriod => flows.push(row.redraw - row.total_payment),
            RedrawTiming::Interleaved => {
                flows.push(-row.total_payment);
                if row.redraw > 0.0 {
                    flows.push(row.redraw);
                }
            }
        }

        rows.push(row);
    }

    debug!(
        "Revolving schedule: line={} rate={} fee={} flows={} ({:?})",
        params.line_amount,
        params.annual_rate,
        params.annual_fee,
        flows.len(),
        params.redraw_timing
    );

    Ok(Schedule {
        flows: CashFlowVector::new(flows)?,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: RevolvingParams =
            serde_json::from_str(r#"{"line_amount": 22500.0, "annual_rate": 0.36}"#).unwrap();
        assert_eq!(params, RevolvingParams::new(22_500.0, 0.36));
        assert_eq!(params.min_payment_fraction, DEFAULT_MIN_PAYMENT_FRACTION);

        let params: RevolvingParams = serde_json::from_str(
            r#"{"line_amount": 22500.0, "annual_rate": 0.36, "redraw_timing": "interleaved"}"#,
        )
        .unwrap();
        assert_eq!(params.redraw_timing, RedrawTiming::Interleaved);
    }

    fn classic_card() -> RevolvingParams {
        RevolvingParams {
            annual_fee: 700.0,
            ..RevolvingParams::new(22_500.0, 0.36)
        }
    }

    #[test]
    fn test_balance_forced_to_zero_at_horizon() {
        for timing in [RedrawTiming::SamePeriod, RedrawTiming::Interleaved] {
            let params = RevolvingParams {
                redraw_timing: timing,
                ..classic_card()
            };
            let schedule = revolving_schedule(&params).unwrap();

            assert!(schedule.flows.len() >= 37);
            assert_eq!(schedule.rows.len(), 36);
            let last = schedule.rows.last().unwrap();
            assert_eq!(last.closing_balance, 0.0);
            assert_eq!(last.redraw, 0.0);
        }
    }

    #[test]
    fn test_redraw_keeps_balance_at_line() {
        let schedule = revolving_schedule(&classic_card()).unwrap();
        let first = &schedule.rows[0];

        assert_relative_eq!(first.interest, 675.0, epsilon = 1e-9);
        assert_relative_eq!(first.scheduled_payment, 1125.0, epsilon = 1e-9);
        assert_relative_eq!(first.redraw, 450.0, epsilon = 1e-9);
        assert_relative_eq!(first.closing_balance, 22_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_annual_fee_every_twelfth_period() {
        let schedule = revolving_schedule(&classic_card()).unwrap();
        let fee_periods: Vec<u32> = schedule
            .rows
            .iter()
            .filter(|r| r.annual_fee > 0.0)
            .map(|r| r.period)
            .collect();
        assert_eq!(fee_periods, vec![12, 24, 36]);
    }

    #[test]
    fn test_final_payment_includes_remaining_balance() {
        let schedule = revolving_schedule(&classic_card()).unwrap();
        let last = schedule.rows.last().unwrap();

        // 22500 + 675 interest - 1125 minimum = 22050 left to pay off
        assert_relative_eq!(last.total_payment, 1125.0 + 700.0 + 22_050.0, epsilon = 1e-6);
        assert_relative_eq!(
            *schedule.flows.as_slice().last().unwrap(),
            -last.total_payment
        );
    }

    #[test]
    fn test_same_period_nets_redraw() {
        let schedule = revolving_schedule(&classic_card()).unwrap();
        let flows = schedule.flows.as_slice();

        assert_eq!(flows.len(), 37);
        assert_eq!(flows[0], 22_500.0);
        assert_relative_eq!(flows[1], -675.0, epsilon = 1e-9);
        assert_relative_eq!(flows[12], -1375.0, epsilon = 1e-9);
    }

    #[test]
    fn test_interleaved_emits_separate_redraws() {
        let params = RevolvingParams {
            redraw_timing: RedrawTiming::Interleaved,
            ..classic_card()
        };
        let schedule = revolving_schedule(&params).unwrap();
        let flows = schedule.flows.as_slice();

        // 35 payment/redraw pairs plus the payoff month
        assert_eq!(flows.len(), 1 + 35 * 2 + 1);
        assert_relative_eq!(flows[1], -1125.0, epsilon = 1e-9);
        assert_relative_eq!(flows[2], 450.0, epsilon = 1e-9);
    }

    #[test]
    fn test_minimum_payment_floor() {
        let params = RevolvingParams::new(1000.0, 0.24);
        let schedule = revolving_schedule(&params).unwrap();

        // 5% of 1000 is 50, below the 100 floor
        assert_eq!(schedule.rows[0].scheduled_payment, MIN_PAYMENT_FLOOR);
    }

    #[test]
    fn test_balance_grows_when_minimum_below_interest() {
        // 1% minimum against 3% monthly interest
        let params = RevolvingParams {
            min_payment_fraction: 0.01,
            ..RevolvingParams::new(50_000.0, 0.36)
        };
        let schedule = revolving_schedule(&params).unwrap();

        assert!(schedule.rows.iter().all(|r| r.redraw == 0.0));
        assert!(schedule.rows[34].closing_balance > 50_000.0);
        assert_eq!(schedule.rows[35].closing_balance, 0.0);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(revolving_schedule(&RevolvingParams::new(0.0, 0.36)).is_err());

        for m in [0.0, -0.1, 1.5, f64::NAN] {
            let params = RevolvingParams {
                min_payment_fraction: m,
                ..RevolvingParams::new(10_000.0, 0.36)
            };
            assert!(matches!(
                revolving_schedule(&params),
                Err(CatError::InvalidSchedule(_))
            ));
        }
    }

    #[test]
    fn test_default_min_payment_from_json() {
        let params: RevolvingParams =
            serde_json::from_str(r#"{"line_amount": 22500, "annual_rate": 0.36}"#).unwrap();
        assert_eq!(params, RevolvingParams::new(22_500.0, 0.36));
    }
}
