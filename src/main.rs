//! CAT Calculator CLI
//!
//! Computes the Total Annual Cost of a credit product from literal parameters

use std::path::PathBuf;

use anyhow::{Context, Result};
use cat_calculator::schedule::ScheduleSummary;
use cat_calculator::tiers::DEFAULT_UDI_VALUE;
use cat_calculator::{
    AutoLoanParams, CardParams, CatCalculator, CatResult, InstallmentParams, RedrawTiming,
    RevolvingParams, Schedule, ScheduleRow, SolverConfig, TierTable,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "cat", version, about = "Total Annual Cost (CAT) calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Include the month-by-month schedule
    #[arg(long, global = true)]
    schedule: bool,

    /// Solver convergence tolerance
    #[arg(long, global = true, default_value_t = 1e-10)]
    tolerance: f64,

    /// Solver iteration budget
    #[arg(long, global = true, default_value_t = 1000)]
    max_iterations: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fixed-installment personal loan
    Installment(InstallmentArgs),
    /// Revolving credit line
    Revolving(RevolvingArgs),
    /// Credit card resolved through a tier table
    Card(CardArgs),
    /// Auto loan on the financed part of a vehicle price
    Auto(AutoArgs),
}

#[derive(Args, Debug)]
struct InstallmentArgs {
    #[arg(long)]
    principal: f64,
    /// Term in months
    #[arg(long)]
    term: u32,
    /// Annual nominal rate as a decimal (0.24 for 24%)
    #[arg(long)]
    rate: f64,
    #[arg(long, default_value_t = 0.0)]
    opening_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    insurance: f64,
    #[arg(long, default_value_t = 0.0)]
    other_initial_costs: f64,
}

#[derive(Args, Debug)]
struct RevolvingArgs {
    #[arg(long)]
    line_amount: f64,
    /// Annual nominal rate as a decimal
    #[arg(long)]
    rate: f64,
    #[arg(long, default_value_t = 0.0)]
    annual_fee: f64,
    /// Minimum payment as a fraction of the balance
    #[arg(long, default_value_t = 0.05)]
    min_payment: f64,
    #[arg(long, default_value_t = 0.0)]
    other_monthly_charges: f64,
    /// Give every re-draw its own discounting index
    #[arg(long)]
    interleaved: bool,
}

#[derive(Args, Debug)]
struct CardArgs {
    #[arg(long, default_value = "classic")]
    tier: String,
    #[arg(long, default_value_t = 0.36)]
    rate: f64,
    #[arg(long, default_value_t = 0.0)]
    annual_fee: f64,
    #[arg(long, default_value_t = 0.05)]
    min_payment: f64,
    /// CSV file with `tier,udis` rows replacing the built-in table
    #[arg(long)]
    tiers: Option<PathBuf>,
    /// UDI to currency conversion value
    #[arg(long, default_value_t = DEFAULT_UDI_VALUE)]
    udi_value: f64,
}

#[derive(Args, Debug)]
struct AutoArgs {
    #[arg(long)]
    price: f64,
    #[arg(long)]
    down_payment: f64,
    #[arg(long)]
    term: u32,
    #[arg(long)]
    rate: f64,
    #[arg(long, default_value_t = 0.0)]
    opening_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    auto_insurance: f64,
    #[arg(long, default_value_t = 0.0)]
    life_insurance: f64,
    #[arg(long, default_value_t = 0.0)]
    gps: f64,
    #[arg(long, default_value_t = 0.0)]
    other_initial_costs: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    product: &'a str,
    result: CatResult,
    summary: ScheduleSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<&'a [ScheduleRow]>,
}

fn build_schedule(calculator: &CatCalculator, command: &Command) -> Result<(&'static str, Schedule)> {
    let built = match command {
        Command::Installment(a) => {
            let params = InstallmentParams {
                opening_fee: a.opening_fee,
                monthly_fee: a.monthly_fee,
                insurance: a.insurance,
                other_initial_costs: a.other_initial_costs,
                ..InstallmentParams::new(a.principal, a.term, a.rate)
            };
            ("installment", calculator.installment_schedule(&params))
        }
        Command::Revolving(a) => {
            let params = RevolvingParams {
                annual_fee: a.annual_fee,
                min_payment_fraction: a.min_payment,
                other_monthly_charges: a.other_monthly_charges,
                redraw_timing: if a.interleaved {
                    RedrawTiming::Interleaved
                } else {
                    RedrawTiming::SamePeriod
                },
                ..RevolvingParams::new(a.line_amount, a.rate)
            };
            ("revolving", calculator.revolving_schedule(&params))
        }
        Command::Card(a) => {
            let tiers = match &a.tiers {
                Some(path) => TierTable::from_csv_path(path, a.udi_value)
                    .with_context(|| format!("Failed to load tier table from {}", path.display()))?,
                None => TierTable::default().with_udi_value(a.udi_value)?,
            };
            let params = CardParams {
                tier: a.tier.clone(),
                annual_rate: a.rate,
                annual_fee: a.annual_fee,
                min_payment_fraction: a.min_payment,
            };
            ("card", calculator.card_schedule(&params, &tiers))
        }
        Command::Auto(a) => {
            let params = AutoLoanParams {
                opening_fee: a.opening_fee,
                monthly_fee: a.monthly_fee,
                auto_insurance: a.auto_insurance,
                life_insurance: a.life_insurance,
                gps: a.gps,
                other_initial_costs: a.other_initial_costs,
                ..AutoLoanParams::new(a.price, a.down_payment, a.term, a.rate)
            };
            ("auto", calculator.auto_loan_schedule(&params))
        }
    };

    let (product, schedule) = built;
    let schedule = schedule.with_context(|| format!("Invalid {} parameters", product))?;
    Ok((product, schedule))
}

fn print_text(product: &str, result: &CatResult, schedule: &Schedule, with_rows: bool) {
    let summary = schedule.summary();

    println!("CAT Calculator v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!("Product: {}", product);
    println!("  Periods: {}", summary.periods);
    println!("  Cash flows: {}", summary.flow_count);
    println!("  Initial disbursement: ${:.2}", summary.initial_disbursement);
    println!("  Total disbursed: ${:.2}", summary.total_disbursed);
    println!("  Total paid: ${:.2}", summary.total_paid);
    println!("  Total interest: ${:.2}", summary.total_interest);
    println!("  Total fees and charges: ${:.2}", summary.total_charges);
    if summary.total_redrawn > 0.0 {
        println!("  Total re-drawn: ${:.2}", summary.total_redrawn);
    }
    println!();

    if with_rows {
        println!("{:>6} {:>14} {:>12} {:>12} {:>10} {:>10} {:>14} {:>12} {:>14}",
            "Period", "Opening", "Interest", "Payment", "Charges", "AnnualFee", "TotalPaid", "Redraw", "Closing");
        println!("{}", "-".repeat(112));
        for row in &schedule.rows {
            println!("{:>6} {:>14.2} {:>12.2} {:>12.2} {:>10.2} {:>10.2} {:>14.2} {:>12.2} {:>14.2}",
                row.period,
                row.opening_balance,
                row.interest,
                row.scheduled_payment,
                row.charges,
                row.annual_fee,
                row.total_payment,
                row.redraw,
                row.closing_balance,
            );
        }
        println!();
    }

    println!("Result:");
    println!("  Monthly rate: {:.8}", result.periodic_rate);
    println!("  Solver: {:?} ({} iterations, residual NPV {:.3e})",
        result.method, result.iterations, result.residual_npv);
    if !result.converged {
        println!("  WARNING: solver did not converge, CAT is a best estimate");
    }
    println!("  CAT: {:.2}%", result.cat_pct);
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let calculator = CatCalculator::with_config(SolverConfig {
        tolerance: cli.tolerance,
        max_iterations: cli.max_iterations,
        ..SolverConfig::default()
    });

    let (product, schedule) = build_schedule(&calculator, &cli.command)?;
    let result = calculator.solve(&schedule.flows);

    if cli.json {
        let report = Report {
            product,
            result,
            summary: schedule.summary(),
            rows: cli.schedule.then_some(schedule.rows.as_slice()),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(product, &result, &schedule, cli.schedule);
    }

    Ok(())
}
