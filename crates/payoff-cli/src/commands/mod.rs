pub mod allocation;
pub mod budget;
pub mod loans;
pub mod schedule;

use chrono::{Datelike, Local, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use payoff_core::Loan;

use crate::input;

/// Defaults taken from the config file, shared by every subcommand.
#[derive(Debug, Default)]
pub struct Defaults {
    pub start_date: Option<NaiveDate>,
    pub baseline_buffer: Option<Decimal>,
}

impl Defaults {
    /// Flag, then input document, then config, then the first of next month.
    pub fn start_date(&self, flag: Option<NaiveDate>, from_input: Option<NaiveDate>) -> NaiveDate {
        flag.or(from_input)
            .or(self.start_date)
            .unwrap_or_else(first_of_next_month)
    }
}

pub fn first_of_next_month() -> NaiveDate {
    let today = Local::now().date_naive();
    let first = today.with_day(1).unwrap_or(today);
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}

/// A typed document from `--input` or piped stdin.
pub fn load_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_json(path)?));
    }
    match input::stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoanFile {
    Bare(Vec<Loan>),
    Wrapped { loans: Vec<Loan> },
}

/// Loans from a `--loans` file: a bare array or an object with a `loans` key.
pub fn read_loans(path: &str) -> Result<Vec<Loan>, Box<dyn std::error::Error>> {
    let file: LoanFile = input::file::read_json(path)?;
    Ok(match file {
        LoanFile::Bare(loans) | LoanFile::Wrapped { loans } => loans,
    })
}
