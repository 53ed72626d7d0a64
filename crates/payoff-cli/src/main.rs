mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use std::process;

use commands::allocation::{AdviseArgs, AllocateArgs};
use commands::budget::CapacityArgs;
use commands::loans::LoansArgs;
use commands::schedule::{CompareArgs, ScheduleArgs};
use commands::Defaults;
use config::CliConfig;

/// Avalanche student-loan payoff projections
#[derive(Parser)]
#[command(
    name = "payoff",
    version,
    about = "Avalanche student-loan payoff projections",
    long_about = "Projects month-by-month payoff of a loan portfolio under the avalanche \
                  strategy (highest rate first) with decimal precision. Splits a single \
                  payment across loans, compares payment levels, and derives a monthly \
                  payment from a budget."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (default json, or `output` from the config file)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// YAML file with default output, log level, start date and baseline buffer
    #[arg(long, global = true, env = "PAYOFF_CONFIG")]
    config: Option<String>,

    /// Log filter for stderr, e.g. `info` or `payoff_core=debug` (RUST_LOG wins)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank payable loans in avalanche order
    Order(LoansArgs),
    /// Totals, weighted rate, and per-type balances for a loan snapshot
    Portfolio(LoansArgs),
    /// Month-by-month avalanche payoff schedule
    Schedule(ScheduleArgs),
    /// Months, total interest and payoff date for a monthly payment
    Summary(ScheduleArgs),
    /// Compare several monthly payment levels
    Compare(CompareArgs),
    /// Split a single payment across loans (interest first, then avalanche)
    Allocate(AllocateArgs),
    /// Allocate a payment and measure its impact against a baseline plan
    Advise(AdviseArgs),
    /// Monthly payment a budget supports
    Capacity(CapacityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let cfg = CliConfig::load(cli.config.as_deref()).unwrap_or_else(|e| fail(e));
    let log_level = cli
        .log_level
        .as_deref()
        .or(cfg.log_level.as_deref())
        .unwrap_or(telemetry::DEFAULT_LOG_LEVEL);
    if let Err(e) = telemetry::init(log_level) {
        fail(e);
    }
    let format = cli.output.or(cfg.output).unwrap_or(OutputFormat::Json);
    let defaults = Defaults {
        start_date: cfg.start_date,
        baseline_buffer: cfg.baseline_buffer,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Order(args) => commands::loans::run_order(args),
        Commands::Portfolio(args) => commands::loans::run_portfolio(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args, &defaults),
        Commands::Summary(args) => commands::schedule::run_summary(args, &defaults),
        Commands::Compare(args) => commands::schedule::run_compare(args, &defaults),
        Commands::Allocate(args) => commands::allocation::run_allocate(args),
        Commands::Advise(args) => commands::allocation::run_advise(args, &defaults),
        Commands::Capacity(args) => commands::budget::run_capacity(args),
        Commands::Version => {
            println!("payoff {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            fail(e);
        }
    }
}
