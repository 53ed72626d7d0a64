use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::amortization::summary::ScenarioSummary;
use crate::error::PayoffError;
use crate::loan::{monthly_interest, total_monthly_interest, validate_loans, Loan};
use crate::ordering::rank_by_avalanche;
use crate::types::*;
use crate::PayoffResult;

/// Hard cap on projected periods (30 years of monthly payments).
pub const PERIOD_CAP: u32 = 360;

/// One simulated month. Monetary fields are rounded to cents; the run
/// itself carries full precision between periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    /// 1-based month number
    pub period: u32,
    /// First day of the month the payment falls in
    pub date: NaiveDate,
    pub payment_made: Money,
    pub interest_accrued: Money,
    /// Payment net of interest; negative when the payment falls short of
    /// the month's interest.
    pub principal_applied: Money,
    pub total_balance_after: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
    pub balances_by_type: BTreeMap<String, Money>,
    /// Loans still owing more than a cent
    pub loans_remaining: u32,
    /// Share of the starting balance retired, in percent (one decimal)
    pub percent_paid_off: Decimal,
}

/// Project month-by-month payoff of `loans` under the avalanche method.
///
/// Every month, interest accrues on each loan's unrounded balance and is paid
/// first; whatever remains of `monthly_payment` goes to principal in fixed
/// avalanche order. Interest the payment cannot cover is dropped, never
/// capitalised, so balances only fall. The run stops once the total balance
/// is within a cent of zero or after [`PERIOD_CAP`] months.
///
/// Returns an empty schedule for an empty loan set or a non-positive payment.
pub fn simulate_amortization(
    loans: &[Loan],
    monthly_payment: Money,
    start_date: NaiveDate,
) -> Vec<SchedulePeriod> {
    let ranked = rank_by_avalanche(loans);
    if ranked.is_empty() || monthly_payment <= Decimal::ZERO {
        return Vec::new();
    }

    tracing::debug!(
        loans = ranked.len(),
        %monthly_payment,
        %start_date,
        "simulating avalanche amortization"
    );

    // Working balances, parallel to `ranked`
    let mut balances: Vec<Money> = ranked.iter().map(|l| l.balance).collect();
    let original_total = outstanding(&balances);
    let first_month = start_date.with_day(1).unwrap_or(start_date);

    let mut schedule = Vec::new();
    let mut cumulative_interest = Decimal::ZERO;
    let mut cumulative_principal = Decimal::ZERO;

    for period in 1..=PERIOD_CAP {
        let total_balance = outstanding(&balances);
        if total_balance <= CENT {
            break;
        }

        let interest: Vec<Money> = ranked
            .iter()
            .zip(&balances)
            .map(|(loan, &balance)| {
                if balance > Decimal::ZERO {
                    monthly_interest(balance, loan.annual_rate_percent)
                } else {
                    Decimal::ZERO
                }
            })
            .collect();
        let total_interest: Money = interest.iter().sum();

        let actual_payment = monthly_payment.min(total_balance + total_interest);

        // Interest is debited in full even if it drives `remaining` negative
        let mut remaining = actual_payment;
        for accrued in &interest {
            remaining -= accrued;
        }

        for balance in balances.iter_mut() {
            if remaining <= Decimal::ZERO {
                break;
            }
            if *balance > Decimal::ZERO {
                let pay = remaining.min(*balance);
                *balance -= pay;
                remaining -= pay;
            }
        }

        let principal = actual_payment - total_interest;
        cumulative_interest += total_interest;
        cumulative_principal += principal;

        let total_after = outstanding(&balances);
        let percent_paid_off = (Decimal::ONE - total_after / original_total) * dec!(100);

        schedule.push(SchedulePeriod {
            period,
            date: period_date(first_month, period),
            payment_made: round_cents(actual_payment),
            interest_accrued: round_cents(total_interest),
            principal_applied: round_cents(principal),
            total_balance_after: round_cents(total_after),
            cumulative_interest: round_cents(cumulative_interest),
            cumulative_principal: round_cents(cumulative_principal),
            balances_by_type: balances_by_type(&ranked, &balances),
            loans_remaining: balances.iter().filter(|&&b| b > CENT).count() as u32,
            percent_paid_off: round_dp(percent_paid_off, 1),
        });

        if total_after <= CENT {
            break;
        }
    }

    if let Some(last) = schedule.last() {
        if last.total_balance_after > CENT {
            tracing::warn!(
                remaining_balance = %last.total_balance_after,
                periods = PERIOD_CAP,
                "schedule truncated before payoff"
            );
        }
    }

    schedule
}

fn outstanding(balances: &[Money]) -> Money {
    balances.iter().map(|b| (*b).max(Decimal::ZERO)).sum()
}

fn period_date(first_month: NaiveDate, period: u32) -> NaiveDate {
    first_month
        .checked_add_months(Months::new(period - 1))
        .unwrap_or(NaiveDate::MAX)
}

fn balances_by_type(ranked: &[&Loan], balances: &[Money]) -> BTreeMap<String, Money> {
    let mut by_type: BTreeMap<String, Money> = BTreeMap::new();
    for (loan, balance) in ranked.iter().zip(balances) {
        *by_type.entry(loan.loan_type.clone()).or_default() += (*balance).max(Decimal::ZERO);
    }
    by_type
        .into_iter()
        .map(|(loan_type, balance)| (loan_type, round_cents(balance)))
        .collect()
}

/// Resolve the projection start date, making sure every capped period can be
/// dated.
pub fn resolve_start_date(start_date: Option<NaiveDate>) -> PayoffResult<NaiveDate> {
    let date = start_date.ok_or_else(|| PayoffError::InvalidInput {
        field: "start_date".into(),
        reason: "A projection start date is required".into(),
    })?;
    let first_month = date.with_day(1).unwrap_or(date);
    if first_month.checked_add_months(Months::new(PERIOD_CAP)).is_none() {
        return Err(PayoffError::DateError(format!(
            "start date {date} leaves no room for a {PERIOD_CAP}-month projection"
        )));
    }
    Ok(first_month)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub loans: Vec<Loan>,
    pub monthly_payment: Money,
    /// First projected month; normalised to the first of the month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub schedule: Vec<SchedulePeriod>,
    pub summary: ScenarioSummary,
    /// False when the period cap was hit with debt still outstanding
    pub paid_off: bool,
}

/// Build a full avalanche amortization schedule with validation and warnings.
pub fn build_amortization_schedule(
    input: &AmortizationInput,
) -> PayoffResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings = validate_loans(&input.loans)?;
    check_amount("monthly_payment", input.monthly_payment)?;
    let start_date = resolve_start_date(input.start_date)?;

    if input.monthly_payment <= Decimal::ZERO {
        warnings.push("Monthly payment is not positive; nothing was projected".into());
    } else {
        let first_interest = round_cents(total_monthly_interest(&input.loans));
        if input.monthly_payment < first_interest {
            warnings.push(format!(
                "Monthly payment {} does not cover first-month interest {}; unpaid interest is dropped, not capitalised",
                input.monthly_payment, first_interest
            ));
        }
    }

    let schedule = simulate_amortization(&input.loans, input.monthly_payment, start_date);
    let summary = ScenarioSummary::from_schedule(&schedule);
    let paid_off = schedule_paid_off(&input.loans, &schedule);
    if !paid_off && !schedule.is_empty() {
        warnings.push(format!(
            "Debt not retired within {PERIOD_CAP} months; schedule is truncated"
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Avalanche Amortization (interest first, fixed rate-descending order)",
        &serde_json::json!({
            "monthly_payment": input.monthly_payment.to_string(),
            "start_date": start_date,
            "period_cap": PERIOD_CAP,
            "interest_capitalised": false,
        }),
        warnings,
        elapsed,
        AmortizationOutput {
            schedule,
            summary,
            paid_off,
        },
    ))
}

/// Whether a schedule ends with the debt retired. An empty schedule counts as
/// paid off only when nothing was owed to begin with.
pub fn schedule_paid_off(loans: &[Loan], schedule: &[SchedulePeriod]) -> bool {
    match schedule.last() {
        Some(last) => last.total_balance_after <= CENT,
        None => crate::loan::total_balance(loans) <= CENT,
    }
}
