//! Rent or Invest - month-by-month projection of buying a mortgaged property
//! versus investing the same capital in a market index
//!
//! This library provides:
//! - Rate resolution (explicit overrides, external estimates, defaults)
//! - Fixed-rate mortgage amortization
//! - Dual-asset monthly compounding with carrying-cost accrual
//! - Capital-gains-adjusted valuation and yearly snapshots
//! - Batch and sensitivity scenario runs

pub mod config;
pub mod error;
pub mod projection;
pub mod rates;
pub mod scenario;

// Re-export commonly used types
pub use config::InvestmentConfiguration;
pub use error::{LoadError, ProjectionError};
pub use projection::{project, ProjectionEngine, ProjectionResult, ProjectionSummary, Snapshot, TaxView};
pub use rates::{resolve, EstimatedRates, RateSet};
pub use scenario::{RateOverrides, ScenarioRunner};
