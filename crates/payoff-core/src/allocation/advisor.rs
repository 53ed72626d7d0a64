use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::allocation::lump_payment::{allocate_lump_payment, AllocationResult};
use crate::amortization::schedule::resolve_start_date;
use crate::amortization::summary::summarize_scenario;
use crate::error::PayoffError;
use crate::loan::{daily_interest, total_balance, total_monthly_interest, validate_loans, Loan};
use crate::types::*;
use crate::PayoffResult;

/// Added to the month's interest to form the "bare minimum" baseline payment.
pub const DEFAULT_BASELINE_BUFFER: Money = dec!(50);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAdviceInput {
    pub loans: Vec<Loan>,
    /// Payment being considered
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Monthly payment to compare against. Defaults to the month's interest
    /// plus `baseline_buffer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_buffer: Option<Money>,
    /// Date of the most recent payment; enables the accrued-interest figures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
    /// Day the accrual is measured to. Required with `last_payment_date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<NaiveDate>,
}

/// Long-run effect of paying `amount` monthly versus the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentImpact {
    pub baseline_payment: Money,
    pub baseline_months: u32,
    pub baseline_interest: Money,
    pub months: u32,
    pub total_interest: Money,
    pub months_saved: i64,
    pub interest_saved: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAdvice {
    pub total_balance: Money,
    pub total_monthly_interest: Money,
    pub total_daily_interest: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_last_payment: Option<i64>,
    /// Simple daily interest accrued since the last payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_since_last_payment: Option<Money>,
    pub allocation: Option<AllocationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<PaymentImpact>,
}

/// Recommend how to split a payment now, and show what paying it every month
/// would save compared with a bare-minimum plan.
pub fn advise_payment(
    input: &PaymentAdviceInput,
) -> PayoffResult<ComputationOutput<PaymentAdvice>> {
    let start = Instant::now();
    let mut warnings = validate_loans(&input.loans)?;
    check_amount("amount", input.amount)?;
    if let Some(baseline) = input.baseline_payment {
        check_amount("baseline_payment", baseline)?;
    }
    if let Some(buffer) = input.baseline_buffer {
        check_amount("baseline_buffer", buffer)?;
    }
    let start_date = resolve_start_date(input.start_date)?;

    if let Some(buffer) = input.baseline_buffer {
        if buffer < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: "baseline_buffer".into(),
                reason: "Baseline buffer must not be negative".into(),
            });
        }
    }

    let monthly_interest = total_monthly_interest(&input.loans);
    let daily: Money = input
        .loans
        .iter()
        .filter(|l| l.is_payable())
        .map(|l| daily_interest(l.balance, l.annual_rate_percent))
        .sum();

    let days_since_last_payment = days_since(input.last_payment_date, input.as_of_date)?;
    let interest_since_last_payment =
        days_since_last_payment.map(|days| round_cents(daily * Decimal::from(days)));

    let allocation = allocate_lump_payment(&input.loans, input.amount);
    let impact = match &allocation {
        Some(result) => {
            if !result.interest_fully_covered {
                warnings.push(
                    "Payment does not cover this month's interest; no principal reduced".into(),
                );
            }
            let baseline_payment = input.baseline_payment.unwrap_or_else(|| {
                monthly_interest + input.baseline_buffer.unwrap_or(DEFAULT_BASELINE_BUFFER)
            });
            let baseline = summarize_scenario(&input.loans, baseline_payment, start_date);
            let this = summarize_scenario(&input.loans, input.amount, start_date);
            Some(PaymentImpact {
                baseline_payment: round_cents(baseline_payment),
                baseline_months: baseline.months,
                baseline_interest: baseline.total_interest,
                months: this.months,
                total_interest: this.total_interest,
                months_saved: i64::from(baseline.months) - i64::from(this.months),
                interest_saved: baseline.total_interest - this.total_interest,
            })
        }
        None => {
            warnings.push("Nothing to allocate".into());
            None
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Payment Advisor (lump allocation with avalanche impact)",
        &serde_json::json!({
            "amount": input.amount.to_string(),
            "start_date": start_date,
            "baseline_buffer": input
                .baseline_buffer
                .unwrap_or(DEFAULT_BASELINE_BUFFER)
                .to_string(),
        }),
        warnings,
        elapsed,
        PaymentAdvice {
            total_balance: round_cents(total_balance(&input.loans)),
            total_monthly_interest: round_cents(monthly_interest),
            total_daily_interest: round_cents(daily),
            days_since_last_payment,
            interest_since_last_payment,
            allocation,
            impact,
        },
    ))
}

/// Whole days from the last payment to the as-of date.
fn days_since(last: Option<NaiveDate>, as_of: Option<NaiveDate>) -> PayoffResult<Option<i64>> {
    let Some(last) = last else {
        return Ok(None);
    };
    let as_of = as_of.ok_or_else(|| PayoffError::InvalidInput {
        field: "as_of_date".into(),
        reason: "An as-of date is required with last_payment_date".into(),
    })?;
    let days = (as_of - last).num_days();
    if days < 0 {
        return Err(PayoffError::InvalidInput {
            field: "last_payment_date".into(),
            reason: format!("Last payment {last} is after the as-of date {as_of}"),
        });
    }
    Ok(Some(days))
}
