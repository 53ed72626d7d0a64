use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::schedule::{resolve_start_date, PERIOD_CAP};
use crate::amortization::summary::{scenario_outcome, ScenarioSummary};
use crate::budget::capacity::{calculate_payment_capacity, PaymentCapacityInput};
use crate::error::PayoffError;
use crate::loan::{validate_loans, Loan};
use crate::types::*;
use crate::PayoffResult;

/// A labelled monthly payment level to test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentScenario {
    pub label: String,
    pub monthly_payment: Money,
}

/// Fixed rungs above the budget-derived plan.
const LADDER_STEPS: [(&str, Money); 3] = [
    ("Aggressive", dec!(2500)),
    ("Very Aggressive", dec!(3000)),
    ("Maximum", dec!(4000)),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparisonInput {
    pub loans: Vec<Loan>,
    /// The first scenario is the baseline the others are measured against.
    /// May be left empty when `budget` is given.
    #[serde(default)]
    pub scenarios: Vec<PaymentScenario>,
    /// Builds the standard ladder (see [`scenarios_from_budget`]) when
    /// `scenarios` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<PaymentCapacityInput>,
    /// Extra "Custom" scenario appended to the list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub label: String,
    pub monthly_payment: Money,
    #[serde(flatten)]
    pub summary: ScenarioSummary,
    pub paid_off: bool,
    /// Interest avoided versus the baseline (negative if more is paid)
    pub interest_saved: Money,
    pub months_saved: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparisonOutput {
    pub baseline: String,
    pub scenarios: Vec<ScenarioRow>,
    /// Cheapest scenario (least interest) among those that retire the debt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheapest: Option<String>,
}

/// The standard payment ladder for a budget: "Minimum Only" at the minimum
/// loan payment, "Current Plan" at the budget's monthly payment rounded to
/// whole currency units, then 2500, 3000 and 4000. A positive `custom`
/// amount adds a final "Custom" rung.
pub fn scenarios_from_budget(
    budget: &PaymentCapacityInput,
    custom: Option<Money>,
) -> PayoffResult<Vec<PaymentScenario>> {
    let capacity = calculate_payment_capacity(budget)?.result;
    let mut ladder = vec![
        PaymentScenario {
            label: "Minimum Only".into(),
            monthly_payment: capacity.minimum_loan_payment,
        },
        PaymentScenario {
            label: "Current Plan".into(),
            monthly_payment: round_dp(capacity.monthly_payment, 0),
        },
    ];
    ladder.extend(LADDER_STEPS.iter().map(|(label, amount)| PaymentScenario {
        label: (*label).into(),
        monthly_payment: *amount,
    }));
    push_custom(&mut ladder, custom);
    Ok(ladder)
}

fn push_custom(scenarios: &mut Vec<PaymentScenario>, custom: Option<Money>) {
    if let Some(amount) = custom.filter(|a| *a > Decimal::ZERO) {
        scenarios.push(PaymentScenario {
            label: "Custom".into(),
            monthly_payment: amount,
        });
    }
}

fn resolve_scenarios(input: &ScenarioComparisonInput) -> PayoffResult<Vec<PaymentScenario>> {
    if !input.scenarios.is_empty() {
        let mut scenarios = input.scenarios.clone();
        push_custom(&mut scenarios, input.custom_payment);
        return Ok(scenarios);
    }
    match &input.budget {
        Some(budget) => scenarios_from_budget(budget, input.custom_payment),
        None => Err(PayoffError::InsufficientData(
            "At least one payment scenario (or a budget) is required".into(),
        )),
    }
}

/// Compare payoff horizons and interest cost across payment levels.
pub fn compare_scenarios(
    input: &ScenarioComparisonInput,
) -> PayoffResult<ComputationOutput<ScenarioComparisonOutput>> {
    let start = Instant::now();
    let scenarios = resolve_scenarios(input)?;
    let mut warnings = validate_loans(&input.loans)?;
    for scenario in &scenarios {
        check_amount("scenarios.monthly_payment", scenario.monthly_payment)?;
    }
    let start_date = resolve_start_date(input.start_date)?;

    let outcomes: Vec<_> = scenarios
        .iter()
        .map(|s| scenario_outcome(&input.loans, s.monthly_payment, start_date))
        .collect();

    let baseline = &outcomes[0].summary;
    let mut rows = Vec::with_capacity(outcomes.len());
    for (scenario, outcome) in scenarios.iter().zip(&outcomes) {
        if !outcome.paid_off {
            warnings.push(format!(
                "Scenario '{}' does not retire the debt within {PERIOD_CAP} months",
                scenario.label
            ));
        }
        rows.push(ScenarioRow {
            label: scenario.label.clone(),
            monthly_payment: scenario.monthly_payment,
            interest_saved: baseline.total_interest - outcome.summary.total_interest,
            months_saved: i64::from(baseline.months) - i64::from(outcome.summary.months),
            summary: outcome.summary.clone(),
            paid_off: outcome.paid_off,
        });
    }

    let cheapest = rows
        .iter()
        .filter(|r| r.paid_off)
        .min_by(|a, b| a.summary.total_interest.cmp(&b.summary.total_interest))
        .map(|r| r.label.clone());

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Avalanche Scenario Comparison",
        &serde_json::json!({
            "scenarios": scenarios.len(),
            "baseline": scenarios[0].label,
            "from_budget": input.scenarios.is_empty(),
            "start_date": start_date,
        }),
        warnings,
        elapsed,
        ScenarioComparisonOutput {
            baseline: scenarios[0].label.clone(),
            scenarios: rows,
            cheapest,
        },
    ))
}
