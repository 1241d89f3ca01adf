//! Property carrying costs and capital-gains-adjusted valuation

use serde::{Deserialize, Serialize};

/// Carrying costs accrued in a single month
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyCarryingCosts {
    pub property_tax: f64,
    pub insurance: f64,
    pub maintenance: f64,
    pub hoa: f64,
    pub mortgage_interest: f64,
}

impl MonthlyCarryingCosts {
    /// Costs for one month at the given property asset value
    pub fn accrue(
        property_asset_value: f64,
        property_tax_rate_annual: f64,
        insurance_annual: f64,
        maintenance_rate_annual: f64,
        hoa_monthly: f64,
        mortgage_interest: f64,
    ) -> Self {
        Self {
            property_tax: property_asset_value * property_tax_rate_annual / 12.0,
            insurance: insurance_annual / 12.0,
            maintenance: maintenance_rate_annual * property_asset_value / 12.0,
            hoa: hoa_monthly,
            mortgage_interest,
        }
    }

    pub fn total(&self) -> f64 {
        self.property_tax + self.insurance + self.maintenance + self.hoa + self.mortgage_interest
    }
}

/// Which values a presentation layer shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxView {
    /// Stock value and property equity as-is
    #[default]
    PreTax,
    /// Net liquidation value after capital-gains tax and, for property, carrying costs
    AfterTax,
}

/// Both tracks valued pre- and after-tax at one point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub stock_pre_tax: f64,
    pub stock_capital_gains_tax: f64,
    pub stock_after_tax: f64,
    pub property_equity: f64,
    pub property_capital_gains_tax: f64,
    pub property_after_tax: f64,
}

/// Value both tracks as if liquidated now
///
/// The property track is charged its full cumulative carrying costs on top of
/// capital-gains tax on equity growth. Equity already reflects interest paid
/// through slower principal reduction, so interest is effectively counted
/// twice. This is a modeling choice kept for comparability, not a tax
/// accounting standard.
pub fn valuate(
    stock_value: f64,
    property_asset_value: f64,
    loan_balance: f64,
    cumulative_carrying_costs: f64,
    initial_capital: f64,
    capital_gains_tax_rate: f64,
) -> Valuation {
    let stock_gain = stock_value - initial_capital;
    let stock_capital_gains_tax = stock_gain.max(0.0) * capital_gains_tax_rate;

    let property_equity = property_asset_value - loan_balance;
    let property_gain = property_equity - initial_capital;
    let property_capital_gains_tax = property_gain.max(0.0) * capital_gains_tax_rate;

    Valuation {
        stock_pre_tax: stock_value,
        stock_capital_gains_tax,
        stock_after_tax: stock_value - stock_capital_gains_tax,
        property_equity,
        property_capital_gains_tax,
        property_after_tax: property_equity - property_capital_gains_tax - cumulative_carrying_costs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_monthly_costs() {
        let costs = MonthlyCarryingCosts::accrue(450_000.0, 0.012, 1_200.0, 0.01, 50.0, 1_950.0);

        assert_relative_eq!(costs.property_tax, 450.0);
        assert_relative_eq!(costs.insurance, 100.0);
        assert_relative_eq!(costs.maintenance, 375.0);
        assert_relative_eq!(costs.total(), 450.0 + 100.0 + 375.0 + 50.0 + 1_950.0);
    }

    #[test]
    fn test_no_gain_no_tax() {
        let v = valuate(90_000.0, 450_000.0, 360_000.0, 0.0, 90_000.0, 0.15);

        assert_eq!(v.stock_capital_gains_tax, 0.0);
        assert_eq!(v.stock_after_tax, 90_000.0);
        assert_eq!(v.property_equity, 90_000.0);
        assert_eq!(v.property_after_tax, 90_000.0);
    }

    #[test]
    fn test_gains_are_taxed_and_costs_charged_to_property() {
        let v = valuate(190_000.0, 500_000.0, 300_000.0, 25_000.0, 90_000.0, 0.15);

        assert_relative_eq!(v.stock_capital_gains_tax, 15_000.0);
        assert_relative_eq!(v.stock_after_tax, 175_000.0);
        assert_relative_eq!(v.property_equity, 200_000.0);
        assert_relative_eq!(v.property_capital_gains_tax, 16_500.0);
        assert_relative_eq!(v.property_after_tax, 200_000.0 - 16_500.0 - 25_000.0);
    }

    #[test]
    fn test_losses_are_not_credited() {
        let v = valuate(80_000.0, 440_000.0, 360_000.0, 0.0, 90_000.0, 0.15);
        assert_eq!(v.stock_after_tax, 80_000.0);
        assert_eq!(v.property_after_tax, 80_000.0);
    }
}
