use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use payoff_core::allocation::{advisor, lump_payment};
use payoff_core::amortization::{comparison, schedule, summary};
use payoff_core::budget::capacity;
use payoff_core::{ordering, portfolio, PayoffResult};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON input, run one envelope operation, serialise its output.
fn call<I, O>(input_json: &str, op: impl FnOnce(&I) -> PayoffResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = op(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan snapshot
// ---------------------------------------------------------------------------

#[napi]
pub fn avalanche_order(input_json: String) -> NapiResult<String> {
    call(&input_json, ordering::build_avalanche_order)
}

#[napi]
pub fn portfolio_snapshot(input_json: String) -> NapiResult<String> {
    call(&input_json, portfolio::analyze_portfolio)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    call(&input_json, schedule::build_amortization_schedule)
}

#[napi]
pub fn amortization_summary(input_json: String) -> NapiResult<String> {
    call(&input_json, summary::summarize_amortization)
}

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    call(&input_json, comparison::compare_scenarios)
}

// ---------------------------------------------------------------------------
// Allocation and budget
// ---------------------------------------------------------------------------

#[napi]
pub fn allocate_lump_payment(input_json: String) -> NapiResult<String> {
    call(&input_json, lump_payment::build_lump_payment_allocation)
}

#[napi]
pub fn advise_payment(input_json: String) -> NapiResult<String> {
    call(&input_json, advisor::advise_payment)
}

#[napi]
pub fn payment_capacity(input_json: String) -> NapiResult<String> {
    call(&input_json, capacity::calculate_payment_capacity)
}
