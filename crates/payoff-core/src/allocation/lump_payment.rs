use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::loan::{monthly_interest, validate_loans, Loan};
use crate::ordering::rank_by_avalanche;
use crate::types::*;
use crate::PayoffResult;

/// How one loan shares in a lump payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub loan_id: String,
    #[serde(rename = "type")]
    pub loan_type: String,
    pub annual_rate_percent: Percent,
    pub balance_before: Money,
    pub interest_covered: Money,
    /// Month's interest left unpaid when the payment could only cover a
    /// proportional share
    pub interest_shortfall: Money,
    pub principal_applied: Money,
    pub total_paid: Money,
    pub balance_after: Money,
    pub is_paid_off: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Lines that received more than half a cent, in avalanche order
    pub lines: Vec<AllocationLine>,
    /// Ids of loans whose balance falls below a cent
    pub paid_off: Vec<String>,
    pub total_principal: Money,
    pub total_interest_paid: Money,
    pub new_total_balance: Money,
    /// Money left after every loan is cleared
    pub leftover: Money,
    /// False when the payment fell short of the month's interest
    pub interest_fully_covered: bool,
}

struct Working<'a> {
    loan: &'a Loan,
    interest: Money,
    shortfall: Money,
    principal: Money,
    balance_after: Money,
}

/// Split a one-off payment across loans for a single month.
///
/// The month's interest on every loan is covered first; if `amount` cannot
/// cover it all, each loan gets the same fraction of its interest and no
/// principal is paid. Otherwise the remainder retires principal in avalanche
/// order. Monetary fields are rounded to cents per line, after allocation.
///
/// Returns `None` for a non-positive amount or when no loan is payable.
pub fn allocate_lump_payment(loans: &[Loan], amount: Money) -> Option<AllocationResult> {
    let ranked = rank_by_avalanche(loans);
    if amount <= Decimal::ZERO || ranked.is_empty() {
        return None;
    }

    let mut work: Vec<Working> = ranked
        .into_iter()
        .map(|loan| Working {
            loan,
            interest: monthly_interest(loan.balance, loan.annual_rate_percent),
            shortfall: Decimal::ZERO,
            principal: Decimal::ZERO,
            balance_after: loan.balance,
        })
        .collect();

    let total_interest: Money = work.iter().map(|w| w.interest).sum();
    let mut remaining = amount;
    let interest_fully_covered = amount >= total_interest;

    if interest_fully_covered {
        remaining -= total_interest;
    } else {
        for w in work.iter_mut() {
            let share = if total_interest.is_zero() {
                Decimal::ZERO
            } else {
                w.interest / total_interest * amount
            };
            w.shortfall = w.interest - share;
            w.interest = share;
        }
        remaining = Decimal::ZERO;
    }

    tracing::debug!(
        %amount,
        %total_interest,
        interest_fully_covered,
        "allocating lump payment"
    );

    for w in work.iter_mut() {
        if remaining <= Decimal::ZERO {
            break;
        }
        let pay = remaining.min(w.loan.balance);
        w.principal = pay;
        w.balance_after = (w.loan.balance - pay).max(Decimal::ZERO);
        remaining -= pay;
    }

    let all_lines: Vec<AllocationLine> = work
        .iter()
        .map(|w| {
            let total_paid = w.interest + w.principal;
            AllocationLine {
                loan_id: w.loan.id.clone(),
                loan_type: w.loan.loan_type.clone(),
                annual_rate_percent: w.loan.annual_rate_percent,
                balance_before: round_cents(w.loan.balance),
                interest_covered: round_cents(w.interest),
                interest_shortfall: round_cents(w.shortfall),
                principal_applied: round_cents(w.principal),
                total_paid: round_cents(total_paid),
                balance_after: round_cents(w.balance_after),
                is_paid_off: w.balance_after < CENT,
            }
        })
        .collect();

    let total_principal = round_cents(all_lines.iter().map(|l| l.principal_applied).sum());
    let total_interest_paid = round_cents(all_lines.iter().map(|l| l.interest_covered).sum());
    let new_total_balance = round_cents(all_lines.iter().map(|l| l.balance_after).sum());
    let paid_off = all_lines
        .iter()
        .filter(|l| l.is_paid_off)
        .map(|l| l.loan_id.clone())
        .collect();
    let lines = all_lines
        .into_iter()
        .filter(|l| l.total_paid > HALF_CENT)
        .collect();

    Some(AllocationResult {
        lines,
        paid_off,
        total_principal,
        total_interest_paid,
        new_total_balance,
        leftover: round_cents(remaining),
        interest_fully_covered,
    })
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpPaymentInput {
    pub loans: Vec<Loan>,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpPaymentOutput {
    /// Absent when there was nothing to allocate
    pub allocation: Option<AllocationResult>,
}

/// Allocate a lump payment with validation and the standard output envelope.
pub fn build_lump_payment_allocation(
    input: &LumpPaymentInput,
) -> PayoffResult<ComputationOutput<LumpPaymentOutput>> {
    let start = Instant::now();
    let mut warnings = validate_loans(&input.loans)?;
    check_amount("amount", input.amount)?;

    let allocation = allocate_lump_payment(&input.loans, input.amount);
    match &allocation {
        None => warnings.push(
            "Nothing allocated: amount is not positive or no active loan carries a balance"
                .into(),
        ),
        Some(result) => {
            if !result.interest_fully_covered {
                warnings.push(format!(
                    "Amount {} does not cover this month's interest; interest paid proportionally, no principal reduced",
                    input.amount
                ));
            }
            if result.leftover > CENT {
                warnings.push(format!(
                    "Amount exceeds all outstanding debt; {} left over",
                    result.leftover
                ));
            }
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lump Payment Allocation (interest first, then avalanche principal)",
        &serde_json::json!({
            "amount": input.amount.to_string(),
            "loans": input.loans.len(),
        }),
        warnings,
        elapsed,
        LumpPaymentOutput { allocation },
    ))
}
