use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::loan::{
    daily_interest, total_balance, total_monthly_interest, validate_loans, weighted_average_rate,
    Loan,
};
use crate::ordering::order_by_avalanche;
use crate::types::*;
use crate::PayoffResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub loans: Vec<Loan>,
}

/// Aggregate position of the payable loans in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub active_loans: u32,
    pub total_balance: Money,
    /// Balance-weighted annual rate, in percent
    pub weighted_average_rate: Percent,
    pub total_monthly_interest: Money,
    pub total_daily_interest: Money,
    pub balances_by_type: BTreeMap<String, Money>,
    pub avalanche_order: Vec<String>,
}

pub fn portfolio_snapshot(loans: &[Loan]) -> PortfolioSnapshot {
    let payable: Vec<&Loan> = loans.iter().filter(|l| l.is_payable()).collect();

    let mut by_type: BTreeMap<String, Money> = BTreeMap::new();
    for loan in &payable {
        *by_type.entry(loan.loan_type.clone()).or_default() += loan.balance;
    }

    PortfolioSnapshot {
        active_loans: payable.len() as u32,
        total_balance: round_cents(total_balance(loans)),
        weighted_average_rate: round_dp(weighted_average_rate(loans), 4),
        total_monthly_interest: round_cents(total_monthly_interest(loans)),
        total_daily_interest: round_cents(
            payable
                .iter()
                .map(|l| daily_interest(l.balance, l.annual_rate_percent))
                .sum(),
        ),
        balances_by_type: by_type
            .into_iter()
            .map(|(k, v)| (k, round_cents(v)))
            .collect(),
        avalanche_order: order_by_avalanche(loans),
    }
}

pub fn analyze_portfolio(
    input: &PortfolioInput,
) -> PayoffResult<ComputationOutput<PortfolioSnapshot>> {
    let start = Instant::now();
    let warnings = validate_loans(&input.loans)?;
    let snapshot = portfolio_snapshot(&input.loans);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Portfolio Snapshot",
        &serde_json::json!({
            "loans": input.loans.len(),
            "interest_basis": "simple, 12 months / 365 days",
        }),
        warnings,
        elapsed,
        snapshot,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanStatus;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn loan(id: &str, balance: Decimal, rate: Decimal, loan_type: &str) -> Loan {
        Loan {
            id: id.into(),
            balance,
            annual_rate_percent: rate,
            loan_type: loan_type.into(),
            status: LoanStatus::Active,
            priority: None,
        }
    }

    #[test]
    fn test_snapshot_totals() {
        let mut closed = loan("1-01", Decimal::ZERO, dec!(3.73), "Subsidized");
        closed.status = LoanStatus::PaidOff;
        let loans = vec![
            loan("2-04", dec!(12000), dec!(7.5), "Grad PLUS"),
            loan("1-03", dec!(4000), dec!(4.5), "Subsidized"),
            closed,
        ];
        let snap = portfolio_snapshot(&loans);

        assert_eq!(snap.active_loans, 2);
        assert_eq!(snap.total_balance, dec!(16000));
        // (12000*7.5 + 4000*4.5) / 16000 = 6.75
        assert_eq!(snap.weighted_average_rate, dec!(6.75));
        // 75 + 15
        assert_eq!(snap.total_monthly_interest, dec!(90));
        assert_eq!(snap.balances_by_type.len(), 2);
        assert_eq!(snap.balances_by_type["Grad PLUS"], dec!(12000));
        assert_eq!(snap.avalanche_order, vec!["2-04", "1-03"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = portfolio_snapshot(&[]);
        assert_eq!(snap.active_loans, 0);
        assert_eq!(snap.total_balance, Decimal::ZERO);
        assert_eq!(snap.weighted_average_rate, Decimal::ZERO);
        assert!(snap.avalanche_order.is_empty());
    }
}
