use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::budget::capacity::{self, Expense, PaymentCapacityInput};

use super::load_input;

/// Arguments for deriving a monthly payment from a budget
#[derive(Args)]
pub struct CapacityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross annual salary
    #[arg(long)]
    pub salary: Option<Decimal>,

    /// Effective tax rate in percent (default 25)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Other monthly net income
    #[arg(long)]
    pub other_income: Option<Decimal>,

    /// Monthly expenses as NAME=AMOUNT (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = parse_expense)]
    pub expenses: Option<Vec<Expense>>,

    /// Required minimum loan payment (default 1200)
    #[arg(long)]
    pub minimum_payment: Option<Decimal>,

    /// Percent of discretionary income sent to debt (default 50)
    #[arg(long)]
    pub extra_percent: Option<Decimal>,
}

fn parse_expense(raw: &str) -> Result<Expense, String> {
    let (name, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT, got '{raw}'"))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("bad amount for '{}': {}", name.trim(), e))?;
    Ok(Expense {
        name: name.trim().to_string(),
        amount,
    })
}

pub fn run_capacity(args: CapacityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: PaymentCapacityInput = if let Some(ref path) = args.input {
        crate::input::file::read_json(path)?
    } else if let Some(salary) = args.salary {
        PaymentCapacityInput {
            gross_annual_salary: salary,
            tax_rate_percent: args.tax_rate,
            other_monthly_income: args.other_income.unwrap_or(Decimal::ZERO),
            expenses: args.expenses.unwrap_or_default(),
            minimum_loan_payment: args.minimum_payment,
            extra_debt_percent: args.extra_percent,
        }
    } else if let Some(input) = load_input(None)? {
        input
    } else {
        return Err("--salary is required (or provide --input or stdin)".into());
    };

    let result = capacity::calculate_payment_capacity(&input)?;
    Ok(serde_json::to_value(result)?)
}
