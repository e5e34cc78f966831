//! Balance state carried through the revolving simulation

/// Outstanding balance of a revolving line at a point in the simulation
#[derive(Debug, Clone)]
pub(crate) struct BalanceState {
    /// Current period (0 = draw-down instant)
    pub period: u32,

    /// Outstanding balance
    pub balance: f64,
}

impl BalanceState {
    /// Full draw-down of the line at period 0
    pub fn drawn(line_amount: f64) -> Self {
        Self {
            period: 0,
            balance: line_amount,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.period += 1;
    }

    /// Settle the period: accrue interest, apply the payment and any re-draw
    pub fn settle(&mut self, interest: f64, payment: f64, redraw: f64) {
        self.balance = self.balance + interest - payment + redraw;
    }

    /// Remaining balance at payoff; the state is left at zero
    pub fn pay_off(&mut self) -> f64 {
        std::mem::take(&mut self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_and_pay_off() {
        let mut state = BalanceState::drawn(1000.0);
        state.advance_month();
        assert_eq!(state.period, 1);

        state.settle(30.0, 50.0, 20.0);
        assert_eq!(state.balance, 1000.0);

        state.settle(30.0, 50.0, 0.0);
        assert_eq!(state.pay_off(), 980.0);
        assert_eq!(state.balance, 0.0);
    }
}
