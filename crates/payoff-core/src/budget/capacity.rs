use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::types::*;
use crate::PayoffResult;

const DEFAULT_TAX_RATE_PERCENT: Percent = dec!(25);
const DEFAULT_MINIMUM_LOAN_PAYMENT: Money = dec!(1200);
const DEFAULT_EXTRA_DEBT_PERCENT: Percent = dec!(50);

/// A recurring monthly expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub name: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCapacityInput {
    pub gross_annual_salary: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate_percent: Option<Percent>,
    #[serde(default)]
    pub other_monthly_income: Money,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_loan_payment: Option<Money>,
    /// Share of discretionary income directed at debt on top of the minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_debt_percent: Option<Percent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCapacityOutput {
    pub monthly_net_income: Money,
    pub total_expenses: Money,
    pub discretionary_income: Money,
    pub extra_payment: Money,
    pub minimum_loan_payment: Money,
    /// Monthly figure to feed the amortization engine
    pub monthly_payment: Money,
    /// Net income left once expenses and the debt payment are met
    pub remaining_after_payment: Money,
}

/// Derive the monthly debt payment a budget supports: the minimum payment plus
/// a fixed share of what is left after tax and expenses.
pub fn calculate_payment_capacity(
    input: &PaymentCapacityInput,
) -> PayoffResult<ComputationOutput<PaymentCapacityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let tax_rate = input.tax_rate_percent.unwrap_or(DEFAULT_TAX_RATE_PERCENT);
    let minimum = input
        .minimum_loan_payment
        .unwrap_or(DEFAULT_MINIMUM_LOAN_PAYMENT);
    let extra_pct = input
        .extra_debt_percent
        .unwrap_or(DEFAULT_EXTRA_DEBT_PERCENT);

    if input.gross_annual_salary < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "gross_annual_salary".into(),
            reason: "Salary must not be negative".into(),
        });
    }
    if tax_rate < Decimal::ZERO || tax_rate > dec!(100) {
        return Err(PayoffError::InvalidInput {
            field: "tax_rate_percent".into(),
            reason: "Tax rate must be between 0 and 100".into(),
        });
    }
    if extra_pct < Decimal::ZERO || extra_pct > dec!(100) {
        return Err(PayoffError::InvalidInput {
            field: "extra_debt_percent".into(),
            reason: "Extra debt share must be between 0 and 100".into(),
        });
    }
    check_amount("gross_annual_salary", input.gross_annual_salary)?;
    check_amount("other_monthly_income", input.other_monthly_income)?;
    check_amount("minimum_loan_payment", minimum)?;
    for expense in &input.expenses {
        check_amount("expenses.amount", expense.amount)?;
    }
    if minimum < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "minimum_loan_payment".into(),
            reason: "Minimum payment must not be negative".into(),
        });
    }

    let monthly_net = input.gross_annual_salary * (Decimal::ONE - tax_rate / dec!(100))
        / dec!(12)
        + input.other_monthly_income;
    let total_expenses: Money = input.expenses.iter().map(|e| e.amount).sum();
    let discretionary = monthly_net - total_expenses;
    if discretionary < Decimal::ZERO {
        warnings.push(format!(
            "Expenses exceed net income by {}; extra payment is negative",
            round_cents(-discretionary)
        ));
    }
    let extra = discretionary * extra_pct / dec!(100);
    let monthly_payment = minimum + extra;
    if monthly_payment <= Decimal::ZERO {
        warnings.push("Budget supports no debt payment".into());
    }
    let remaining = discretionary - monthly_payment;
    if remaining < Decimal::ZERO {
        warnings.push(format!(
            "Income falls {} short after expenses and the debt payment",
            round_cents(-remaining)
        ));
    }

    let output = PaymentCapacityOutput {
        monthly_net_income: round_cents(monthly_net),
        total_expenses: round_cents(total_expenses),
        discretionary_income: round_cents(discretionary),
        extra_payment: round_cents(extra),
        minimum_loan_payment: round_cents(minimum),
        monthly_payment: round_cents(monthly_payment),
        remaining_after_payment: round_cents(remaining),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly Payment Capacity (minimum + share of discretionary income)",
        &serde_json::json!({
            "tax_rate_percent": tax_rate.to_string(),
            "minimum_loan_payment": minimum.to_string(),
            "extra_debt_percent": extra_pct.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_budget() -> PaymentCapacityInput {
        PaymentCapacityInput {
            gross_annual_salary: dec!(95000),
            tax_rate_percent: Some(dec!(28)),
            other_monthly_income: Decimal::ZERO,
            expenses: vec![
                Expense { name: "Rent".into(), amount: dec!(1800) },
                Expense { name: "Car Payment".into(), amount: dec!(450) },
                Expense { name: "Groceries".into(), amount: dec!(480) },
            ],
            minimum_loan_payment: Some(dec!(850)),
            extra_debt_percent: Some(dec!(60)),
        }
    }

    #[test]
    fn test_capacity_known_answer() {
        let out = calculate_payment_capacity(&demo_budget()).unwrap().result;
        // 95000 * 0.72 / 12 = 5700
        assert_eq!(out.monthly_net_income, dec!(5700));
        assert_eq!(out.total_expenses, dec!(2730));
        assert_eq!(out.discretionary_income, dec!(2970));
        // 2970 * 0.6 = 1782
        assert_eq!(out.extra_payment, dec!(1782));
        assert_eq!(out.monthly_payment, dec!(2632));
        // 5700 - 2730 - 2632
        assert_eq!(out.remaining_after_payment, dec!(338));
    }

    #[test]
    fn test_defaults_apply() {
        let input = PaymentCapacityInput {
            gross_annual_salary: dec!(48000),
            tax_rate_percent: None,
            other_monthly_income: dec!(200),
            expenses: vec![],
            minimum_loan_payment: None,
            extra_debt_percent: None,
        };
        let out = calculate_payment_capacity(&input).unwrap().result;
        // 48000 * 0.75 / 12 + 200 = 3200; 1200 + 3200 * 0.5 = 2800
        assert_eq!(out.monthly_net_income, dec!(3200));
        assert_eq!(out.monthly_payment, dec!(2800));
        assert_eq!(out.remaining_after_payment, dec!(400));
    }

    #[test]
    fn test_minimum_beyond_income_leaves_deficit() {
        let input = PaymentCapacityInput {
            gross_annual_salary: dec!(48000),
            tax_rate_percent: None,
            other_monthly_income: Decimal::ZERO,
            expenses: vec![],
            minimum_loan_payment: Some(dec!(5000)),
            extra_debt_percent: None,
        };
        let out = calculate_payment_capacity(&input).unwrap();
        // 3000 net; 5000 + 1500 extra = 6500 owed
        assert_eq!(out.result.monthly_payment, dec!(6500));
        assert_eq!(out.result.remaining_after_payment, dec!(-3500));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("3500"));
    }

    #[test]
    fn test_oversized_salary_rejected() {
        let mut input = demo_budget();
        input.gross_annual_salary = dec!(70000000000000000000000000000);
        assert!(calculate_payment_capacity(&input).is_err());
    }

    #[test]
    fn test_overspent_budget_warns() {
        let mut input = demo_budget();
        input.expenses.push(Expense { name: "Travel".into(), amount: dec!(4000) });
        let out = calculate_payment_capacity(&input).unwrap();
        assert!(out.result.discretionary_income < Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_invalid_tax_rate() {
        let mut input = demo_budget();
        input.tax_rate_percent = Some(dec!(120));
        assert!(calculate_payment_capacity(&input).is_err());
    }
}
