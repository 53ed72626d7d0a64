use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PayoffError;
use crate::PayoffResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Annual rates expressed as percentages (5.28 = 5.28% per year), as loan
/// servicers quote them.
pub type Percent = Decimal;

/// Balances at or below one cent count as paid off.
pub const CENT: Money = dec!(0.01);

/// Allocation lines paying this much or less are noise, not a payment.
pub const HALF_CENT: Money = dec!(0.005);

/// Largest balance or payment the envelopes accept (one trillion). Every
/// product and running total of a capped projection stays far inside
/// `Decimal`'s 96-bit range below it.
pub const MAX_AMOUNT: Money = dec!(1000000000000);

/// Largest annual rate, in percent, the envelopes accept.
pub const MAX_RATE_PERCENT: Percent = dec!(1000);

/// Reject a caller-supplied amount whose magnitude exceeds [`MAX_AMOUNT`].
pub fn check_amount(field: &str, value: Money) -> PayoffResult<()> {
    if value.abs() > MAX_AMOUNT {
        return Err(PayoffError::InvalidInput {
            field: field.into(),
            reason: format!("{value} exceeds the supported maximum of {MAX_AMOUNT}"),
        });
    }
    Ok(())
}

/// Round a monetary amount to the nearest cent (half away from zero).
pub fn round_cents(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to an arbitrary number of decimal places (half away from zero).
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
