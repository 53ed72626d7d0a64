pub mod error;
pub mod loan;
pub mod ordering;
pub mod portfolio;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "allocation")]
pub mod allocation;

#[cfg(feature = "budget")]
pub mod budget;

pub use error::PayoffError;
pub use loan::{Loan, LoanStatus};
pub use ordering::order_by_avalanche;
pub use types::*;

#[cfg(feature = "amortization")]
pub use amortization::schedule::{simulate_amortization, SchedulePeriod, PERIOD_CAP};
#[cfg(feature = "amortization")]
pub use amortization::summary::{summarize_scenario, ScenarioSummary};

#[cfg(feature = "allocation")]
pub use allocation::lump_payment::{allocate_lump_payment, AllocationLine, AllocationResult};

/// Standard result type for all payoff operations
pub type PayoffResult<T> = Result<T, PayoffError>;
