//! Yearly snapshots and the projection result derived from them

use serde::{Deserialize, Serialize};

use super::costs::{valuate, TaxView};
use super::state::SimulationState;
use crate::rates::RateSet;

/// Recorded state for one sampled year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Calendar year label
    pub year_label: String,
    /// Years since purchase (0 = initial state)
    pub year_index: u32,
    pub month_index: u32,

    // Display values for both views
    pub stock_pre_tax: f64,
    pub stock_after_tax: f64,
    pub property_pre_tax: f64,
    pub property_after_tax: f64,

    // Liquidation taxes
    pub stock_capital_gains_tax: f64,
    pub property_capital_gains_tax: f64,

    // Diagnostics
    pub annual_property_tax: f64,
    pub cumulative_property_tax: f64,
    pub property_asset_value: f64,
    pub property_equity: f64,
    pub cumulative_carrying_costs: f64,
    pub loan_balance: f64,
    pub cumulative_mortgage_interest: f64,
}

impl Snapshot {
    /// Capture the current state, valued both pre- and after-tax
    pub fn capture(
        state: &SimulationState,
        initial_capital: f64,
        capital_gains_tax_rate: f64,
        property_tax_rate_annual: f64,
        start_year: i32,
    ) -> Self {
        let valuation = valuate(
            state.stock_value,
            state.property_asset_value,
            state.loan_balance,
            state.cumulative_carrying_costs,
            initial_capital,
            capital_gains_tax_rate,
        );
        let year_index = state.year_index();

        Self {
            year_label: (start_year + year_index as i32).to_string(),
            year_index,
            month_index: state.month_index,
            stock_pre_tax: valuation.stock_pre_tax,
            stock_after_tax: valuation.stock_after_tax,
            property_pre_tax: valuation.property_equity,
            property_after_tax: valuation.property_after_tax,
            stock_capital_gains_tax: valuation.stock_capital_gains_tax,
            property_capital_gains_tax: valuation.property_capital_gains_tax,
            annual_property_tax: state.property_asset_value * property_tax_rate_annual,
            cumulative_property_tax: state.cumulative_property_tax,
            property_asset_value: state.property_asset_value,
            property_equity: valuation.property_equity,
            cumulative_carrying_costs: state.cumulative_carrying_costs,
            loan_balance: state.loan_balance,
            cumulative_mortgage_interest: state.cumulative_mortgage_interest,
        }
    }

    /// Stock track value shown under `view`
    pub fn stock_value(&self, view: TaxView) -> f64 {
        match view {
            TaxView::PreTax => self.stock_pre_tax,
            TaxView::AfterTax => self.stock_after_tax,
        }
    }

    /// Property track value shown under `view`
    pub fn property_value(&self, view: TaxView) -> f64 {
        match view {
            TaxView::PreTax => self.property_pre_tax,
            TaxView::AfterTax => self.property_after_tax,
        }
    }
}

/// Which track ended ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Stock,
    Property,
}

/// Complete projection output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// View used for display values and the summary
    pub tax_view: TaxView,

    /// Rates the run used, with provenance and metadata
    pub rates: RateSet,

    /// Fixed monthly mortgage payment
    pub monthly_payment: f64,

    /// One snapshot per year; index 0 is the purchase date
    pub snapshots: Vec<Snapshot>,
}

impl ProjectionResult {
    pub fn new(tax_view: TaxView, rates: RateSet, monthly_payment: f64) -> Self {
        Self {
            tax_view,
            rates,
            monthly_payment,
            snapshots: Vec::new(),
        }
    }

    pub fn add_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    /// Same snapshots under a different view; nothing is re-simulated
    pub fn with_view(&self, tax_view: TaxView) -> Self {
        Self {
            tax_view,
            ..self.clone()
        }
    }

    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// (year label, stock, property) display series for charting
    pub fn display_series(&self) -> Vec<(&str, f64, f64)> {
        self.snapshots
            .iter()
            .map(|s| {
                (
                    s.year_label.as_str(),
                    s.stock_value(self.tax_view),
                    s.property_value(self.tax_view),
                )
            })
            .collect()
    }

    /// Summary under the result's own view
    pub fn summary(&self) -> Option<ProjectionSummary> {
        self.summary_for(self.tax_view)
    }

    /// Summary derived purely from the snapshot sequence
    pub fn summary_for(&self, view: TaxView) -> Option<ProjectionSummary> {
        let first = self.snapshots.first()?;
        let last = self.snapshots.last()?;

        let initial_capital = first.stock_pre_tax;
        let final_stock = last.stock_value(view);
        let final_property = last.property_value(view);

        let winner = if final_stock > final_property {
            Winner::Stock
        } else {
            Winner::Property
        };
        let winner_value = final_stock.max(final_property);

        let difference = (final_stock - final_property).abs();
        let floor = final_stock.min(final_property);
        let outperformance_percent = (floor > 0.0).then(|| difference / floor * 100.0);

        let winner_total_return_percent = (initial_capital > 0.0)
            .then(|| (winner_value - initial_capital) / initial_capital * 100.0);

        let tax_drag_percent =
            (final_property > 0.0).then(|| last.cumulative_property_tax / final_property * 100.0);

        let years = last.year_index;

        Some(ProjectionSummary {
            tax_view: view,
            years,
            initial_capital,
            final_stock,
            final_property,
            winner,
            outperformance_percent,
            difference,
            winner_total_return_percent,
            first_year_property_tax: self
                .snapshots
                .get(1)
                .map(|s| s.annual_property_tax)
                .unwrap_or(0.0),
            total_property_tax: last.cumulative_property_tax,
            total_carrying_costs: last.cumulative_carrying_costs,
            total_mortgage_interest: last.cumulative_mortgage_interest,
            tax_drag_percent,
            stock_annualized_return: annualized_return(initial_capital, final_stock, years),
            property_annualized_return: annualized_return(initial_capital, final_property, years),
        })
    }
}

/// Implied constant annual growth from `start` to `end` over `years`
fn annualized_return(start: f64, end: f64, years: u32) -> Option<f64> {
    if years == 0 || start <= 0.0 || end <= 0.0 {
        return None;
    }
    Some((end / start).powf(1.0 / years as f64) - 1.0)
}

/// Headline metrics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub tax_view: TaxView,
    pub years: u32,
    pub initial_capital: f64,
    pub final_stock: f64,
    pub final_property: f64,
    pub winner: Winner,
    /// |stock - property| / min(stock, property) * 100; absent when the smaller is not positive
    pub outperformance_percent: Option<f64>,
    /// Absolute gap between the tracks ("missed growth")
    pub difference: f64,
    pub winner_total_return_percent: Option<f64>,
    pub first_year_property_tax: f64,
    pub total_property_tax: f64,
    pub total_carrying_costs: f64,
    pub total_mortgage_interest: f64,
    /// Cumulative property tax as a share of the final property value
    pub tax_drag_percent: Option<f64>,
    pub stock_annualized_return: Option<f64>,
    pub property_annualized_return: Option<f64>,
}

impl ProjectionSummary {
    pub fn winner_value(&self) -> f64 {
        match self.winner {
            Winner::Stock => self.final_stock,
            Winner::Property => self.final_property,
        }
    }
}
