use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::allocation::advisor::{self, PaymentAdviceInput};
use payoff_core::allocation::lump_payment::{self, LumpPaymentInput};

use super::{load_input, read_loans, Defaults};

/// Arguments for splitting a single payment across loans
#[derive(Args)]
pub struct AllocateArgs {
    /// Path to JSON input file (flags below override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON array of loans
    #[arg(long, conflicts_with = "input")]
    pub loans: Option<String>,

    /// Payment amount to allocate
    #[arg(long)]
    pub amount: Option<Decimal>,
}

pub fn run_allocate(args: AllocateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input: LumpPaymentInput = if let Some(ref path) = args.loans {
        let amount = args.amount.ok_or("--amount is required with --loans")?;
        LumpPaymentInput {
            loans: read_loans(path)?,
            amount,
        }
    } else if let Some(input) = load_input(args.input.as_deref())? {
        input
    } else {
        return Err("--input <file.json>, stdin, or --loans with --amount required".into());
    };

    if let Some(amount) = args.amount {
        input.amount = amount;
    }
    let result = lump_payment::build_lump_payment_allocation(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the payment advisor
#[derive(Args)]
pub struct AdviseArgs {
    /// Path to JSON input file (flags below override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON array of loans
    #[arg(long, conflicts_with = "input")]
    pub loans: Option<String>,

    /// Payment being considered
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Monthly payment to measure the impact against
    #[arg(long)]
    pub baseline_payment: Option<Decimal>,

    /// Added to monthly interest when no baseline payment is given
    #[arg(long)]
    pub baseline_buffer: Option<Decimal>,

    /// First payment month (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Date of the most recent payment, for interest accrued since then
    #[arg(long)]
    pub last_payment_date: Option<NaiveDate>,

    /// Day to measure accrual to (default today)
    #[arg(long)]
    pub as_of_date: Option<NaiveDate>,
}

pub fn run_advise(
    args: AdviseArgs,
    defaults: &Defaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input: PaymentAdviceInput = if let Some(ref path) = args.loans {
        let amount = args.amount.ok_or("--amount is required with --loans")?;
        PaymentAdviceInput {
            loans: read_loans(path)?,
            amount,
            start_date: None,
            baseline_payment: None,
            baseline_buffer: None,
            last_payment_date: None,
            as_of_date: None,
        }
    } else if let Some(input) = load_input(args.input.as_deref())? {
        input
    } else {
        return Err("--input <file.json>, stdin, or --loans with --amount required".into());
    };

    if let Some(amount) = args.amount {
        input.amount = amount;
    }
    if args.baseline_payment.is_some() {
        input.baseline_payment = args.baseline_payment;
    }
    input.baseline_buffer = args
        .baseline_buffer
        .or(input.baseline_buffer)
        .or(defaults.baseline_buffer);
    input.start_date = Some(defaults.start_date(args.start_date, input.start_date));
    if args.last_payment_date.is_some() {
        input.last_payment_date = args.last_payment_date;
    }
    if input.last_payment_date.is_some() {
        input.as_of_date = args
            .as_of_date
            .or(input.as_of_date)
            .or_else(|| Some(Local::now().date_naive()));
    }

    let result = advisor::advise_payment(&input)?;
    Ok(serde_json::to_value(result)?)
}
