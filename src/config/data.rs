//! User-entered financial parameters for one analysis run

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// Capital-gains rate applied to both tracks on liquidation
pub const DEFAULT_CAPITAL_GAINS_TAX_RATE: f64 = 0.15;

/// Longest accepted mortgage term
pub const MAX_LOAN_TERM_YEARS: u32 = 100;

/// Longest accepted projection horizon
pub const MAX_HORIZON_YEARS: u32 = 200;

fn default_purchase_price() -> f64 { 450_000.0 }
fn default_down_payment_percent() -> f64 { 20.0 }
fn default_interest_rate_percent() -> f64 { 6.5 }
fn default_loan_term_years() -> u32 { 30 }
fn default_insurance_annual() -> f64 { 1_200.0 }
fn default_maintenance_rate() -> f64 { 0.01 }
fn default_horizon_years() -> u32 { 15 }
fn default_capital_gains_tax_rate() -> f64 { DEFAULT_CAPITAL_GAINS_TAX_RATE }
fn default_benchmark() -> String { "SPY".to_string() }

/// Current calendar year, used only to label snapshots
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Immutable inputs for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentConfiguration {
    /// Property purchase price
    #[serde(default = "default_purchase_price")]
    pub purchase_price: f64,

    /// Down payment as a percent of purchase price (0-100)
    #[serde(default = "default_down_payment_percent")]
    pub down_payment_percent: f64,

    /// Fixed mortgage rate in percent (6.5 = 6.5%)
    #[serde(default = "default_interest_rate_percent")]
    pub annual_interest_rate_percent: f64,

    /// Mortgage term in years
    #[serde(default = "default_loan_term_years")]
    pub loan_term_years: u32,

    /// Monthly association fees
    #[serde(default)]
    pub hoa_monthly: f64,

    /// Annual homeowner's insurance
    #[serde(default = "default_insurance_annual")]
    pub insurance_annual: f64,

    /// Annual maintenance as a fraction of property value
    #[serde(default = "default_maintenance_rate")]
    pub maintenance_rate_annual: f64,

    /// Explicit property tax rate override (fraction)
    #[serde(default)]
    pub property_tax_rate_annual: Option<f64>,

    /// Explicit appreciation rate override (fraction)
    #[serde(default)]
    pub property_appreciation_rate_annual: Option<f64>,

    /// Explicit benchmark CAGR override (fraction)
    #[serde(default)]
    pub stock_cagr_annual: Option<f64>,

    /// Projection horizon in years
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    /// Capital-gains tax rate applied on liquidation
    #[serde(default = "default_capital_gains_tax_rate")]
    pub capital_gains_tax_rate: f64,

    /// Benchmark ticker label (display only)
    #[serde(default = "default_benchmark")]
    pub benchmark: String,

    /// Calendar year of month 0 (labels only)
    #[serde(default = "current_year")]
    pub start_year: i32,
}

impl Default for InvestmentConfiguration {
    fn default() -> Self {
        Self {
            purchase_price: default_purchase_price(),
            down_payment_percent: default_down_payment_percent(),
            annual_interest_rate_percent: default_interest_rate_percent(),
            loan_term_years: default_loan_term_years(),
            hoa_monthly: 0.0,
            insurance_annual: default_insurance_annual(),
            maintenance_rate_annual: default_maintenance_rate(),
            property_tax_rate_annual: None,
            property_appreciation_rate_annual: None,
            stock_cagr_annual: None,
            horizon_years: default_horizon_years(),
            capital_gains_tax_rate: default_capital_gains_tax_rate(),
            benchmark: default_benchmark(),
            start_year: current_year(),
        }
    }
}

impl InvestmentConfiguration {
    /// Down payment amount; both tracks start from this capital
    pub fn down_payment(&self) -> f64 {
        self.purchase_price * self.down_payment_percent / 100.0
    }

    /// Mortgage principal (purchase price less down payment); exactly zero for all-cash
    pub fn loan_principal(&self) -> f64 {
        if self.down_payment_percent >= 100.0 {
            return 0.0;
        }
        (self.purchase_price - self.down_payment()).max(0.0)
    }

    /// Simulated months, horizon floored at one year
    pub fn total_months(&self) -> u32 {
        self.horizon_years.max(1).saturating_mul(12)
    }

    /// Loan term in months, floored at one
    pub fn term_months(&self) -> u32 {
        self.loan_term_years.saturating_mul(12).max(1)
    }

    /// Reject configurations the engine cannot project
    pub fn validate(&self) -> Result<(), ProjectionError> {
        if !self.purchase_price.is_finite() || self.purchase_price <= 0.0 {
            return Err(ProjectionError::invalid("purchase_price", "must be positive"));
        }
        if !(0.0..=100.0).contains(&self.down_payment_percent) {
            return Err(ProjectionError::invalid(
                "down_payment_percent",
                "must be between 0 and 100",
            ));
        }
        if !self.annual_interest_rate_percent.is_finite() || self.annual_interest_rate_percent < 0.0 {
            return Err(ProjectionError::invalid(
                "annual_interest_rate_percent",
                "must be zero or positive",
            ));
        }
        if !(1..=MAX_LOAN_TERM_YEARS).contains(&self.loan_term_years) {
            return Err(ProjectionError::invalid(
                "loan_term_years",
                format!("must be between 1 and {}", MAX_LOAN_TERM_YEARS),
            ));
        }
        if !(1..=MAX_HORIZON_YEARS).contains(&self.horizon_years) {
            return Err(ProjectionError::invalid(
                "horizon_years",
                format!("must be between 1 and {}", MAX_HORIZON_YEARS),
            ));
        }

        let non_negative = [
            ("hoa_monthly", self.hoa_monthly),
            ("insurance_annual", self.insurance_annual),
            ("maintenance_rate_annual", self.maintenance_rate_annual),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ProjectionError::invalid(field, "must be zero or positive"));
            }
        }

        if !(0.0..=1.0).contains(&self.capital_gains_tax_rate) {
            return Err(ProjectionError::invalid(
                "capital_gains_tax_rate",
                "must be a fraction between 0 and 1",
            ));
        }

        let overrides = [
            ("property_tax_rate_annual", self.property_tax_rate_annual),
            ("property_appreciation_rate_annual", self.property_appreciation_rate_annual),
            ("stock_cagr_annual", self.stock_cagr_annual),
        ];
        for (field, value) in overrides {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ProjectionError::invalid(field, "override must be finite"));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_matches_reference_inputs() {
        let config = InvestmentConfiguration::default();
        assert_relative_eq!(config.down_payment(), 90_000.0);
        assert_relative_eq!(config.loan_principal(), 360_000.0);
        assert_eq!(config.total_months(), 180);
        assert_eq!(config.term_months(), 360);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let config = InvestmentConfiguration {
            purchase_price: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProjectionError::InvalidConfiguration { field: "purchase_price", .. })
        ));
    }

    #[test]
    fn test_rejects_down_payment_out_of_range() {
        for pct in [-1.0, 100.5, f64::NAN] {
            let config = InvestmentConfiguration {
                down_payment_percent: pct,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted down payment {}", pct);
        }
    }

    #[test]
    fn test_rejects_zero_horizon_and_term() {
        let config = InvestmentConfiguration {
            horizon_years: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = InvestmentConfiguration {
            loan_term_years: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_override() {
        let config = InvestmentConfiguration {
            stock_cagr_annual: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProjectionError::InvalidConfiguration { field: "stock_cagr_annual", .. })
        ));
    }

    #[test]
    fn test_boundary_down_payments_are_valid() {
        for pct in [0.0, 100.0] {
            let config = InvestmentConfiguration {
                down_payment_percent: pct,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_all_cash_leaves_no_principal() {
        // price * 100 / 100 rounds below the price for this value
        let config = InvestmentConfiguration {
            purchase_price: 1_352_298.798_682_888_3,
            down_payment_percent: 100.0,
            ..Default::default()
        };
        assert_eq!(config.loan_principal(), 0.0);
    }

    #[test]
    fn test_rejects_oversized_term_and_horizon() {
        let config = InvestmentConfiguration {
            loan_term_years: 400_000_000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProjectionError::InvalidConfiguration { field: "loan_term_years", .. })
        ));
        assert_eq!(config.term_months(), u32::MAX);

        let config = InvestmentConfiguration {
            horizon_years: MAX_HORIZON_YEARS + 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProjectionError::InvalidConfiguration { field: "horizon_years", .. })
        ));

        let config = InvestmentConfiguration {
            loan_term_years: MAX_LOAN_TERM_YEARS,
            horizon_years: MAX_HORIZON_YEARS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_total_months_floors_horizon() {
        let config = InvestmentConfiguration {
            horizon_years: 0,
            ..Default::default()
        };
        assert_eq!(config.total_months(), 12);
    }
}
