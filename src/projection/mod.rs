//! Projection engine: amortization, dual-asset growth, costs and yearly snapshots

mod amortization;
mod costs;
mod engine;
mod growth;
mod snapshots;
mod state;

pub use amortization::{
    advance_loan_month, compute_monthly_payment, monthly_loan_rate, AmortizationRow, LoanTerms,
};
pub use costs::{valuate, MonthlyCarryingCosts, TaxView, Valuation};
pub use engine::{project, ProjectionEngine, SnapshotSampler};
pub use growth::{advance_growth, monthly_equivalent_rate};
pub use snapshots::{ProjectionResult, ProjectionSummary, Snapshot, Winner};
pub use state::SimulationState;
