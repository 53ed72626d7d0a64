use clap::Args;
use serde_json::Value;

use payoff_core::ordering::{self, AvalancheOrderInput};
use payoff_core::portfolio::{self, PortfolioInput};
use payoff_core::Loan;

use super::{load_input, read_loans};

/// Arguments shared by the loan-only commands
#[derive(Args)]
pub struct LoansArgs {
    /// Path to JSON input file ({"loans": [...]})
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON array of loans
    #[arg(long, conflicts_with = "input")]
    pub loans: Option<String>,
}

fn resolve_loans(args: &LoansArgs) -> Result<Vec<Loan>, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.loans {
        return read_loans(path);
    }
    match load_input::<PortfolioInput>(args.input.as_deref())? {
        Some(input) => Ok(input.loans),
        None => Err("--input <file.json>, --loans <file.json> or stdin required".into()),
    }
}

pub fn run_order(args: LoansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = AvalancheOrderInput {
        loans: resolve_loans(&args)?,
    };
    let result = ordering::build_avalanche_order(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_portfolio(args: LoansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = PortfolioInput {
        loans: resolve_loans(&args)?,
    };
    let result = portfolio::analyze_portfolio(&input)?;
    Ok(serde_json::to_value(result)?)
}
