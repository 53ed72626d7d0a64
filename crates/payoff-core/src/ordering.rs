use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::loan::{validate_loans, Loan};
use crate::types::*;
use crate::PayoffResult;

/// Rank payable loans for the avalanche method: highest annual rate first.
///
/// Equal rates keep the caller's sequence: explicit `priority` first, then
/// input position. The sort is stable, so identical snapshots always rank
/// identically.
pub fn rank_by_avalanche(loans: &[Loan]) -> Vec<&Loan> {
    let mut ranked: Vec<(usize, &Loan)> = loans
        .iter()
        .enumerate()
        .filter(|(_, l)| l.is_payable())
        .collect();

    ranked.sort_by(|(ia, a), (ib, b)| {
        b.annual_rate_percent
            .cmp(&a.annual_rate_percent)
            .then_with(|| {
                a.priority
                    .unwrap_or(u32::MAX)
                    .cmp(&b.priority.unwrap_or(u32::MAX))
            })
            .then_with(|| ia.cmp(ib))
    });

    ranked.into_iter().map(|(_, l)| l).collect()
}

/// Loan ids in avalanche payoff order.
pub fn order_by_avalanche(loans: &[Loan]) -> Vec<String> {
    rank_by_avalanche(loans)
        .into_iter()
        .map(|l| l.id.clone())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvalancheOrderInput {
    pub loans: Vec<Loan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedLoan {
    /// 1-based payoff rank
    pub rank: u32,
    pub id: String,
    pub annual_rate_percent: Percent,
    pub balance: Money,
    #[serde(rename = "type")]
    pub loan_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvalancheOrderOutput {
    pub order: Vec<RankedLoan>,
}

/// Rank a loan snapshot with validation and the standard output envelope.
pub fn build_avalanche_order(
    input: &AvalancheOrderInput,
) -> PayoffResult<ComputationOutput<AvalancheOrderOutput>> {
    let start = Instant::now();
    let warnings = validate_loans(&input.loans)?;

    let order = rank_by_avalanche(&input.loans)
        .into_iter()
        .zip(1u32..)
        .map(|(loan, rank)| RankedLoan {
            rank,
            id: loan.id.clone(),
            annual_rate_percent: loan.annual_rate_percent,
            balance: round_cents(loan.balance),
            loan_type: loan.loan_type.clone(),
        })
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Avalanche Ordering (rate descending, stable on ties)",
        &serde_json::json!({
            "loans": input.loans.len(),
        }),
        warnings,
        elapsed,
        AvalancheOrderOutput { order },
    ))
}
