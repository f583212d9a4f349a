mod engine;
mod lmi;
mod loan;
mod snapshot;
mod tax;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{MAX_HORIZON_YEARS, calculate, run_projection};
pub use lmi::{LMI_FREE_LVR_PCT, estimate_lmi_cost, select_tier};
pub use loan::{LoanState, YearSimulation, monthly_payment, simulate_year};
pub use snapshot::{Household, calculate_snapshot};
pub use tax::{annual_tax, marginal_rate};
pub use types::{
    CalculationResult, ExpenseBreakdown, Inputs, LmiTier, LoanType, PersonTaxOutcome,
    PersonTaxProfile, ProjectionResult, SnapshotResult, TaxBracket, YearlyProjectionRecord,
    floor_zero,
};
