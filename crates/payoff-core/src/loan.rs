use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::PayoffError;
use crate::types::*;
use crate::PayoffResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const DAYS_PER_YEAR: Decimal = dec!(365);

/// Servicing status of a loan. Only active loans take part in payoff math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    #[serde(alias = "Active")]
    Active,
    #[serde(alias = "Paid Off", alias = "paid off")]
    PaidOff,
}

/// A point-in-time snapshot of one installment loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    /// Current principal owed
    pub balance: Money,
    pub annual_rate_percent: Percent,
    /// Reporting category (e.g. "Grad PLUS", "Unsubsidized")
    #[serde(rename = "type", default)]
    pub loan_type: String,
    #[serde(default)]
    pub status: LoanStatus,
    /// Repository sequence used to break ties between equal rates.
    /// Falls back to input position when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl Loan {
    /// Whether the loan takes part in payoff math: active and owing something.
    pub fn is_payable(&self) -> bool {
        self.status == LoanStatus::Active && self.balance > Decimal::ZERO
    }
}

/// One month of simple interest on `balance` at an annual percentage rate.
pub fn monthly_interest(balance: Money, annual_rate_percent: Percent) -> Money {
    balance * annual_rate_percent / dec!(100) / MONTHS_PER_YEAR
}

/// One day of simple interest on `balance` (365-day year).
pub fn daily_interest(balance: Money, annual_rate_percent: Percent) -> Money {
    balance * annual_rate_percent / dec!(100) / DAYS_PER_YEAR
}

/// Sum of balances of payable loans.
pub fn total_balance(loans: &[Loan]) -> Money {
    loans
        .iter()
        .filter(|l| l.is_payable())
        .map(|l| l.balance)
        .sum()
}

/// Sum of one month's interest across payable loans.
pub fn total_monthly_interest(loans: &[Loan]) -> Money {
    loans
        .iter()
        .filter(|l| l.is_payable())
        .map(|l| monthly_interest(l.balance, l.annual_rate_percent))
        .sum()
}

/// Balance-weighted average annual rate (percent) of payable loans.
/// Returns zero when nothing is owed.
pub fn weighted_average_rate(loans: &[Loan]) -> Percent {
    let total = total_balance(loans);
    if total.is_zero() {
        return Decimal::ZERO;
    }
    let weighted: Decimal = loans
        .iter()
        .filter(|l| l.is_payable())
        .map(|l| l.balance * l.annual_rate_percent)
        .sum();
    weighted / total
}

/// Validate a loan snapshot before it reaches the engine.
///
/// Malformed records are errors; loans the engine would silently skip are
/// reported back as warnings.
pub fn validate_loans(loans: &[Loan]) -> PayoffResult<Vec<String>> {
    let mut warnings = Vec::new();
    let mut seen: HashSet<&str> = HashSet::with_capacity(loans.len());

    for loan in loans {
        if loan.id.trim().is_empty() {
            return Err(PayoffError::InvalidInput {
                field: "loans.id".into(),
                reason: "Loan id must not be empty".into(),
            });
        }
        if !seen.insert(loan.id.as_str()) {
            return Err(PayoffError::InvalidInput {
                field: "loans.id".into(),
                reason: format!("Duplicate loan id '{}'", loan.id),
            });
        }
        if loan.annual_rate_percent < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: "loans.annual_rate_percent".into(),
                reason: format!("Loan '{}' has a negative interest rate", loan.id),
            });
        }
        if loan.annual_rate_percent > MAX_RATE_PERCENT {
            return Err(PayoffError::InvalidInput {
                field: "loans.annual_rate_percent".into(),
                reason: format!(
                    "Loan '{}' rate exceeds the supported maximum of {}%",
                    loan.id, MAX_RATE_PERCENT
                ),
            });
        }
        check_amount("loans.balance", loan.balance)?;

        if loan.status != LoanStatus::Active {
            warnings.push(format!("Loan '{}' excluded: not active", loan.id));
        } else if loan.balance <= Decimal::ZERO {
            warnings.push(format!("Loan '{}' excluded: no balance owed", loan.id));
        }
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(id: &str, balance: Decimal, rate: Decimal) -> Loan {
        Loan {
            id: id.into(),
            balance,
            annual_rate_percent: rate,
            loan_type: "Unsubsidized".into(),
            status: LoanStatus::Active,
            priority: None,
        }
    }

    #[test]
    fn test_monthly_interest() {
        assert_eq!(round_cents(monthly_interest(dec!(1000), dec!(10))), dec!(8.33));
        assert_eq!(monthly_interest(dec!(50), dec!(6)), dec!(0.25));
    }

    #[test]
    fn test_daily_interest() {
        assert_eq!(daily_interest(dec!(36500), dec!(1)), dec!(1));
    }

    #[test]
    fn test_weighted_average_rate() {
        let loans = vec![loan("a", dec!(1000), dec!(10)), loan("b", dec!(3000), dec!(2))];
        // (1000*10 + 3000*2) / 4000 = 4
        assert_eq!(weighted_average_rate(&loans), dec!(4));
    }

    #[test]
    fn test_weighted_average_rate_empty() {
        assert_eq!(weighted_average_rate(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_paid_off_loans_not_payable() {
        let mut paid = loan("p", dec!(500), dec!(4));
        paid.status = LoanStatus::PaidOff;
        let zero = loan("z", Decimal::ZERO, dec!(4));
        assert!(!paid.is_payable());
        assert!(!zero.is_payable());
        assert_eq!(total_balance(&[paid, zero]), Decimal::ZERO);
    }

    #[test]
    fn test_validate_warns_on_excluded() {
        let mut paid = loan("p", dec!(500), dec!(4));
        paid.status = LoanStatus::PaidOff;
        let warnings = validate_loans(&[loan("a", dec!(1), dec!(1)), paid]).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'p'"));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let loans = vec![loan("a", dec!(1), dec!(1)), loan("a", dec!(2), dec!(2))];
        assert!(validate_loans(&loans).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_rate() {
        assert!(validate_loans(&[loan("a", dec!(1), dec!(-1))]).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_balance() {
        let huge: Loan = serde_json::from_str(
            r#"{"id":"x","balance":"70000000000000000000000000000","annual_rate_percent":"10"}"#,
        )
        .unwrap();
        match validate_loans(&[huge]) {
            Err(PayoffError::InvalidInput { field, .. }) => assert_eq!(field, "loans.balance"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert!(validate_loans(&[loan("ok", MAX_AMOUNT, MAX_RATE_PERCENT)]).is_ok());
        assert!(validate_loans(&[loan("r", dec!(1), dec!(1000.01))]).is_err());
    }

    #[test]
    fn test_status_accepts_repository_spelling() {
        let l: Loan = serde_json::from_str(
            r#"{"id":"1-01","balance":0,"annual_rate_percent":3.73,"type":"Subsidized","status":"Paid Off"}"#,
        )
        .unwrap();
        assert_eq!(l.status, LoanStatus::PaidOff);
        assert_eq!(l.loan_type, "Subsidized");
    }
}
