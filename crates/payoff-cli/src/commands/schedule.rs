use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::amortization::comparison::{self, PaymentScenario, ScenarioComparisonInput};
use payoff_core::amortization::schedule::{self, AmortizationInput};
use payoff_core::amortization::summary;

use super::{load_input, read_loans, Defaults};
use crate::input;

/// Arguments for the payoff schedule and its summary
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (flags below override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON array of loans
    #[arg(long, conflicts_with = "input")]
    pub loans: Option<String>,

    /// Fixed total payment made every month
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,

    /// First payment month (YYYY-MM-DD, normalised to the 1st)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

fn amortization_input(
    args: ScheduleArgs,
    defaults: &Defaults,
) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    let mut input: AmortizationInput = if let Some(ref path) = args.loans {
        let monthly_payment = args
            .monthly_payment
            .ok_or("--monthly-payment is required with --loans")?;
        AmortizationInput {
            loans: read_loans(path)?,
            monthly_payment,
            start_date: None,
        }
    } else if let Some(input) = load_input(args.input.as_deref())? {
        input
    } else {
        return Err("--input <file.json>, stdin, or --loans with --monthly-payment required".into());
    };

    if let Some(payment) = args.monthly_payment {
        input.monthly_payment = payment;
    }
    input.start_date = Some(defaults.start_date(args.start_date, input.start_date));
    Ok(input)
}

pub fn run_schedule(
    args: ScheduleArgs,
    defaults: &Defaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let input = amortization_input(args, defaults)?;
    let result = schedule::build_amortization_schedule(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(
    args: ScheduleArgs,
    defaults: &Defaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let input = amortization_input(args, defaults)?;
    let result = summary::summarize_amortization(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for comparing monthly payment levels
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file (flags below override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON array of loans
    #[arg(long, conflicts_with = "input")]
    pub loans: Option<String>,

    /// Monthly payments to compare (comma-separated; the first is the baseline).
    /// Replaces the document's scenarios.
    #[arg(long, value_delimiter = ',')]
    pub payments: Option<Vec<Decimal>>,

    /// Labels for the scenarios, in order
    #[arg(long, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// Budget JSON file; builds the standard ladder when no payments are given
    #[arg(long)]
    pub budget: Option<String>,

    /// Extra "Custom" monthly payment to append
    #[arg(long)]
    pub custom_payment: Option<Decimal>,

    /// First payment month (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

fn label_scenarios(payments: Vec<Decimal>, labels: &[String]) -> Vec<PaymentScenario> {
    payments
        .into_iter()
        .enumerate()
        .map(|(i, monthly_payment)| PaymentScenario {
            label: labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Scenario {}", i + 1)),
            monthly_payment,
        })
        .collect()
}

pub fn run_compare(
    args: CompareArgs,
    defaults: &Defaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input: ScenarioComparisonInput = if let Some(ref path) = args.loans {
        if args.payments.is_none() && args.budget.is_none() {
            return Err("--payments or --budget is required with --loans".into());
        }
        ScenarioComparisonInput {
            loans: read_loans(path)?,
            scenarios: Vec::new(),
            budget: None,
            custom_payment: None,
            start_date: None,
        }
    } else if let Some(input) = load_input(args.input.as_deref())? {
        input
    } else {
        return Err("--input <file.json>, stdin, or --loans with --payments required".into());
    };

    let labels = args.labels.unwrap_or_default();
    if let Some(payments) = args.payments {
        input.scenarios = label_scenarios(payments, &labels);
    } else {
        for (scenario, label) in input.scenarios.iter_mut().zip(&labels) {
            scenario.label = label.clone();
        }
    }
    if let Some(ref path) = args.budget {
        input.budget = Some(input::file::read_json(path)?);
    }
    if args.custom_payment.is_some() {
        input.custom_payment = args.custom_payment;
    }
    input.start_date = Some(defaults.start_date(args.start_date, input.start_date));

    let result = comparison::compare_scenarios(&input)?;
    Ok(serde_json::to_value(result)?)
}
