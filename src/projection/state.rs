//! Simulation state for one projection run

use crate::config::InvestmentConfiguration;

/// Both tracks and the loan at a point in time
///
/// Owned by a single run; each month produces a new value rather than mutating
/// shared state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Months simulated so far (0 = purchase date)
    pub month_index: u32,

    /// Value of the index investment
    pub stock_value: f64,

    /// Total property value, the basis for tax and maintenance
    pub property_asset_value: f64,

    /// Outstanding mortgage balance
    pub loan_balance: f64,

    /// Property tax paid to date
    pub cumulative_property_tax: f64,

    /// Tax + insurance + maintenance + HOA + mortgage interest paid to date
    pub cumulative_carrying_costs: f64,

    /// Mortgage interest paid to date
    pub cumulative_mortgage_interest: f64,
}

impl SimulationState {
    /// Month 0: both tracks hold the down payment, the loan is fully outstanding
    pub fn initial(config: &InvestmentConfiguration) -> Self {
        Self {
            month_index: 0,
            stock_value: config.down_payment(),
            property_asset_value: config.purchase_price,
            loan_balance: config.loan_principal().max(0.0),
            cumulative_property_tax: 0.0,
            cumulative_carrying_costs: 0.0,
            cumulative_mortgage_interest: 0.0,
        }
    }

    /// Property asset value less outstanding loan
    pub fn property_equity(&self) -> f64 {
        self.property_asset_value - self.loan_balance
    }

    /// Whether this month is sampled into a snapshot
    pub fn is_year_boundary(&self) -> bool {
        self.month_index % 12 == 0
    }

    /// Completed years
    pub fn year_index(&self) -> u32 {
        self.month_index / 12
    }
}
