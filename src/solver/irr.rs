//! Damped Newton-Raphson IRR with a bisection fallback

use log::{debug, warn};

use super::npv::{npv, npv_and_derivative};
use super::{IrrSolution, RateSolver, SolveMethod, SolverConfig};
use crate::schedule::CashFlowVector;

/// Consecutive clamp resets after which Newton is treated as pinned at a boundary
const BOUNDARY_STALL_LIMIT: u32 = 2;

/// Halvings allowed when pulling an overflowing bracket endpoint toward zero
const ENDPOINT_SHRINK_LIMIT: u32 = 64;

/// Move `rate` toward zero until the NPV there is finite.
///
/// Long schedules overflow `(1 + rate)^-k` near -1, so a configured lower
/// bound is halved until it can be evaluated.
fn finite_endpoint(cashflows: &[f64], mut rate: f64) -> Option<(f64, f64)> {
    for _ in 0..=ENDPOINT_SHRINK_LIMIT {
        let value = npv(cashflows, rate);
        if value.is_finite() {
            return Some((rate, value));
        }
        rate /= 2.0;
    }
    None
}

/// Newton-Raphson IRR solver with rate clamping.
///
/// Each iteration takes a Newton step; steps at or below zero reset to
/// `floor_reset` and steps above `rate_cap` reset to `cap_reset`. When the
/// derivative vanishes, the iterate is pinned at either boundary, or the iteration
/// budget runs out, the solver bisects over `bracket` if one is configured.
#[derive(Debug, Clone, Default)]
pub struct NewtonRaphsonSolver {
    config: SolverConfig,
}

impl NewtonRaphsonSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn converged(&self, rate: f64, npv: f64, iterations: u32, method: SolveMethod) -> IrrSolution {
        debug!(
            "IRR converged via {:?}: rate={:.12} npv={:.3e} after {} iterations",
            method, rate, npv, iterations
        );
        IrrSolution {
            rate,
            npv,
            iterations,
            converged: true,
            method,
        }
    }

    /// Bisection over the configured bracket, or `None` if there is no usable bracket
    fn bisect(&self, cashflows: &[f64], spent: u32) -> Option<IrrSolution> {
        let (low, high) = self.config.bracket?;
        let tolerance = self.config.tolerance;

        let (Some((mut low, mut npv_low)), Some((mut high, npv_high))) =
            (finite_endpoint(cashflows, low), finite_endpoint(cashflows, high))
        else {
            warn!(
                "Bisection bracket [{}, {}] overflows the NPV, no fallback available",
                low, high
            );
            return None;
        };

        // Check that we have a root in this interval
        if npv_low * npv_high > 0.0 {
            warn!("Bisection bracket [{}, {}] holds no sign change", low, high);
            return None;
        }

        let mut mid = (low + high) / 2.0;
        let mut npv_mid = npv(cashflows, mid);

        for iteration in 0..self.config.max_iterations {
            mid = (low + high) / 2.0;
            npv_mid = npv(cashflows, mid);

            if npv_mid.abs() < tolerance || (high - low) / 2.0 < tolerance {
                return Some(self.converged(
                    mid,
                    npv_mid,
                    spent + iteration + 1,
                    SolveMethod::Bisection,
                ));
            }

            if npv_mid * npv_low < 0.0 {
                high = mid;
            } else {
                low = mid;
                npv_low = npv_mid;
            }
        }

        warn!(
            "Bisection did not converge within {} iterations, residual npv={:.3e}",
            self.config.max_iterations, npv_mid
        );
        Some(IrrSolution {
            rate: mid,
            npv: npv_mid,
            iterations: spent + self.config.max_iterations,
            converged: false,
            method: SolveMethod::Bisection,
        })
    }
}

impl RateSolver for NewtonRaphsonSolver {
    fn solve(&self, flows: &CashFlowVector) -> IrrSolution {
        let cashflows = flows.as_slice();
        let config = &self.config;

        let mut rate = config.initial_guess;
        let mut boundary_hits = 0;

        for iteration in 0..config.max_iterations {
            let (npv_val, dnpv) = npv_and_derivative(cashflows, rate);

            if npv_val.abs() < config.tolerance {
                return self.converged(rate, npv_val, iteration + 1, SolveMethod::Newton);
            }

            let next = if dnpv != 0.0 && dnpv.is_finite() {
                rate - npv_val / dnpv
            } else {
                debug!("NPV derivative vanished at rate={}", rate);
                if let Some(solution) = self.bisect(cashflows, iteration + 1) {
                    return solution;
                }
                // Stationary point with no bracket: nudge the rate and keep going
                rate * 1.1
            };

            if (next - rate).abs() < config.tolerance {
                let residual = npv(cashflows, next);
                return self.converged(next, residual, iteration + 1, SolveMethod::Newton);
            }

            let next = if next <= 0.0 {
                boundary_hits += 1;
                config.floor_reset
            } else if next > config.rate_cap {
                boundary_hits += 1;
                config.cap_reset
            } else {
                boundary_hits = 0;
                next
            };

            if boundary_hits >= BOUNDARY_STALL_LIMIT {
                if let Some(solution) = self.bisect(cashflows, iteration + 1) {
                    return solution;
                }
            }

            rate = next;
        }

        if let Some(solution) = self.bisect(cashflows, config.max_iterations) {
            return solution;
        }

        let residual = npv(cashflows, rate);
        warn!(
            "IRR did not converge after {} iterations, returning best estimate rate={} (npv={:.3e})",
            config.max_iterations, rate, residual
        );
        IrrSolution {
            rate,
            npv: residual,
            iterations: config.max_iterations,
            converged: false,
            method: SolveMethod::Newton,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn flows(v: Vec<f64>) -> CashFlowVector {
        CashFlowVector::new(v).unwrap()
    }

    #[test]
    fn test_single_period_return() {
        let solution = NewtonRaphsonSolver::default().solve(&flows(vec![100.0, -110.0]));
        assert!(solution.converged);
        assert_eq!(solution.method, SolveMethod::Newton);
        assert_relative_eq!(solution.rate, 0.10, epsilon = 1e-10);
    }

    #[test]
    fn test_level_payments_round_trip() {
        // Loan of $10000, 12 monthly payments of $900
        let mut cashflows = vec![10000.0];
        cashflows.extend(vec![-900.0; 12]);
        let cfv = flows(cashflows);

        let solution = NewtonRaphsonSolver::default().solve(&cfv);
        assert!(solution.converged);
        assert!(solution.rate > 0.0);
        assert_abs_diff_eq!(npv(cfv.as_slice(), solution.rate), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_rate_root_falls_back_to_bisection() {
        let mut cashflows = vec![1200.0];
        cashflows.extend(vec![-100.0; 12]);

        let solution = NewtonRaphsonSolver::default().solve(&flows(cashflows));
        assert!(solution.converged);
        assert_eq!(solution.method, SolveMethod::Bisection);
        assert_abs_diff_eq!(solution.rate, 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_negative_root_found_by_bisection() {
        // Borrower repays less than received: rate of return is negative
        let solution = NewtonRaphsonSolver::default().solve(&flows(vec![100.0, -95.0]));
        assert!(solution.converged);
        assert_relative_eq!(solution.rate, -0.05, epsilon = 1e-8);
    }

    #[test]
    fn test_without_bracket_returns_best_estimate() {
        let config = SolverConfig {
            bracket: None,
            max_iterations: 50,
            ..SolverConfig::default()
        };
        let solution = NewtonRaphsonSolver::new(config).solve(&flows(vec![100.0, -95.0]));

        // Pinned at the floor reset, reported but not an error
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 50);
        assert_eq!(solution.rate, 0.001);
    }

    #[test]
    fn test_high_rate_is_capped_then_converges() {
        // 150% per period: beyond the cap, reachable only through the bracket
        let solution = NewtonRaphsonSolver::default().solve(&flows(vec![100.0, -250.0]));
        assert!(solution.converged);
        assert_relative_eq!(solution.rate, 1.5, epsilon = 1e-8);
    }

    #[test]
    fn test_long_zero_rate_schedule_shrinks_bracket() {
        // 1200 months: NPV at -0.5 overflows, the lower bound is pulled in
        let mut cashflows = vec![12_000.0];
        cashflows.extend(vec![-10.0; 1200]);
        let cfv = flows(cashflows);
        assert!(!npv(cfv.as_slice(), -0.5).is_finite());

        let solution = NewtonRaphsonSolver::default().solve(&cfv);
        assert!(solution.converged);
        assert_eq!(solution.method, SolveMethod::Bisection);
        assert_abs_diff_eq!(solution.rate, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_finite_endpoint_halves_toward_zero() {
        let mut cashflows = vec![12_000.0];
        cashflows.extend(vec![-10.0; 1200]);

        let (rate, value) = finite_endpoint(&cashflows, -0.5).unwrap();
        assert!(rate > -0.5 && rate < 0.0);
        assert!(value.is_finite());
        assert_eq!(finite_endpoint(&cashflows, 10.0).unwrap().0, 10.0);
    }

    #[test]
    fn test_interleaved_sign_changes() {
        let cfv = flows(vec![22500.0, -1125.0, 450.0, -1125.0, 450.0, -22050.0]);
        let solution = NewtonRaphsonSolver::default().solve(&cfv);
        assert!(solution.converged);
        assert_abs_diff_eq!(solution.npv, 0.0, epsilon = 1e-6);
    }
}
