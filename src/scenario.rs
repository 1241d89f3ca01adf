//! Scenario runner for batch and sensitivity projections
//!
//! Holds a base configuration and optional rate estimates once, then runs many
//! projections that differ only in rate overrides or horizon. Each run owns its
//! own engine and state, so batches run in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::InvestmentConfiguration;
use crate::error::ProjectionError;
use crate::projection::{ProjectionEngine, ProjectionResult, ProjectionSummary, TaxView};
use crate::rates::EstimatedRates;

/// Explicit rate overrides layered on top of the base configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateOverrides {
    pub property_tax_rate_annual: Option<f64>,
    pub property_appreciation_rate_annual: Option<f64>,
    pub stock_cagr_annual: Option<f64>,
}

impl RateOverrides {
    /// Copy of `config` with these overrides applied; unset fields keep the base value
    pub fn apply_to(&self, config: &InvestmentConfiguration) -> InvestmentConfiguration {
        InvestmentConfiguration {
            property_tax_rate_annual: self.property_tax_rate_annual.or(config.property_tax_rate_annual),
            property_appreciation_rate_annual: self
                .property_appreciation_rate_annual
                .or(config.property_appreciation_rate_annual),
            stock_cagr_annual: self.stock_cagr_annual.or(config.stock_cagr_annual),
            ..config.clone()
        }
    }
}

/// One cell of a stock CAGR x appreciation grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub stock_cagr: f64,
    pub appreciation_rate: f64,
    pub summary: ProjectionSummary,
}

/// Pre-configured runner for many projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(config);
/// let grid = runner.sensitivity_grid(&[0.06, 0.08, 0.10], &[0.03, 0.05], TaxView::AfterTax)?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_config: InvestmentConfiguration,
    estimated: Option<EstimatedRates>,
}

impl ScenarioRunner {
    pub fn new(base_config: InvestmentConfiguration) -> Self {
        Self {
            base_config,
            estimated: None,
        }
    }

    /// Runner whose rates fall back to external estimates before defaults
    pub fn with_estimates(base_config: InvestmentConfiguration, estimated: EstimatedRates) -> Self {
        Self {
            base_config,
            estimated: Some(estimated),
        }
    }

    fn engine_for(&self, config: InvestmentConfiguration) -> Result<ProjectionEngine, ProjectionError> {
        ProjectionEngine::from_estimates(config, self.estimated.as_ref())
    }

    /// Run the base configuration
    pub fn run(&self, tax_view: TaxView) -> Result<ProjectionResult, ProjectionError> {
        Ok(self.engine_for(self.base_config.clone())?.project(tax_view))
    }

    /// Run one projection per override set, in parallel; results keep input order
    pub fn run_with_overrides(
        &self,
        overrides: &[RateOverrides],
        tax_view: TaxView,
    ) -> Vec<Result<ProjectionResult, ProjectionError>> {
        overrides
            .par_iter()
            .map(|o| -> Result<ProjectionResult, ProjectionError> {
                Ok(self.engine_for(o.apply_to(&self.base_config))?.project(tax_view))
            })
            .collect()
    }

    /// Run the base configuration over several horizons
    pub fn run_horizons(
        &self,
        horizons: &[u32],
        tax_view: TaxView,
    ) -> Vec<Result<ProjectionResult, ProjectionError>> {
        horizons
            .par_iter()
            .map(|&horizon_years| -> Result<ProjectionResult, ProjectionError> {
                let config = InvestmentConfiguration {
                    horizon_years,
                    ..self.base_config.clone()
                };
                Ok(self.engine_for(config)?.project(tax_view))
            })
            .collect()
    }

    /// Summaries over every stock CAGR x appreciation pair, row-major by CAGR
    pub fn sensitivity_grid(
        &self,
        stock_cagrs: &[f64],
        appreciation_rates: &[f64],
        tax_view: TaxView,
    ) -> Result<Vec<SensitivityPoint>, ProjectionError> {
        let cells: Vec<(f64, f64)> = stock_cagrs
            .iter()
            .flat_map(|&cagr| appreciation_rates.iter().map(move |&appr| (cagr, appr)))
            .collect();

        cells
            .par_iter()
            .map(|&(stock_cagr, appreciation_rate)| -> Result<SensitivityPoint, ProjectionError> {
                let overrides = RateOverrides {
                    stock_cagr_annual: Some(stock_cagr),
                    property_appreciation_rate_annual: Some(appreciation_rate),
                    ..Default::default()
                };
                let result = self
                    .engine_for(overrides.apply_to(&self.base_config))?
                    .project(tax_view);
                let summary = result.summary().ok_or(ProjectionError::InvalidConfiguration {
                    field: "horizon_years",
                    reason: "projection produced no snapshots".to_string(),
                })?;
                Ok(SensitivityPoint {
                    stock_cagr,
                    appreciation_rate,
                    summary,
                })
            })
            .collect()
    }

    pub fn config(&self) -> &InvestmentConfiguration {
        &self.base_config
    }
}
