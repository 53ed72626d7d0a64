use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::schedule::{
    resolve_start_date, schedule_paid_off, simulate_amortization, AmortizationInput,
    SchedulePeriod, PERIOD_CAP,
};
use crate::loan::{validate_loans, Loan};
use crate::types::*;
use crate::PayoffResult;

/// Headline figures of one payoff scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub months: u32,
    pub total_interest: Money,
    pub total_paid: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

impl ScenarioSummary {
    /// Read the summary off the final period. Empty schedules summarise to
    /// zero with no payoff date.
    pub fn from_schedule(schedule: &[SchedulePeriod]) -> Self {
        match schedule.last() {
            Some(last) => ScenarioSummary {
                months: last.period,
                total_interest: last.cumulative_interest,
                total_paid: last.cumulative_interest + last.cumulative_principal,
                payoff_date: Some(last.date),
            },
            None => ScenarioSummary::default(),
        }
    }
}

/// Summarise paying `monthly_payment` every month under the avalanche method.
pub fn summarize_scenario(
    loans: &[Loan],
    monthly_payment: Money,
    start_date: NaiveDate,
) -> ScenarioSummary {
    ScenarioSummary::from_schedule(&simulate_amortization(loans, monthly_payment, start_date))
}

/// A summary plus whether the debt was actually retired inside the cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    #[serde(flatten)]
    pub summary: ScenarioSummary,
    pub paid_off: bool,
    /// Balance left after the final projected month
    pub remaining_balance: Money,
}

pub fn scenario_outcome(
    loans: &[Loan],
    monthly_payment: Money,
    start_date: NaiveDate,
) -> ScenarioOutcome {
    let schedule = simulate_amortization(loans, monthly_payment, start_date);
    let remaining_balance = match schedule.last() {
        Some(last) => last.total_balance_after,
        None => round_cents(crate::loan::total_balance(loans)),
    };
    ScenarioOutcome {
        summary: ScenarioSummary::from_schedule(&schedule),
        paid_off: schedule_paid_off(loans, &schedule),
        remaining_balance,
    }
}

/// Scenario summary with validation and the standard output envelope.
pub fn summarize_amortization(
    input: &AmortizationInput,
) -> PayoffResult<ComputationOutput<ScenarioOutcome>> {
    let start = Instant::now();
    let mut warnings = validate_loans(&input.loans)?;
    check_amount("monthly_payment", input.monthly_payment)?;
    let start_date = resolve_start_date(input.start_date)?;

    if input.monthly_payment <= Decimal::ZERO {
        warnings.push("Monthly payment is not positive; summary is zero".into());
    }

    let outcome = scenario_outcome(&input.loans, input.monthly_payment, start_date);
    if !outcome.paid_off && outcome.summary.months > 0 {
        warnings.push(format!(
            "Debt not retired within {PERIOD_CAP} months; {} remains",
            outcome.remaining_balance
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Avalanche Scenario Summary",
        &serde_json::json!({
            "monthly_payment": input.monthly_payment.to_string(),
            "start_date": start_date,
        }),
        warnings,
        elapsed,
        outcome,
    ))
}
