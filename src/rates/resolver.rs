//! Merge explicit overrides, external estimates and defaults into one rate set

use log::debug;
use serde::{Deserialize, Serialize};

use super::EstimatedRates;
use crate::config::InvestmentConfiguration;
use crate::error::ProjectionError;

/// Property tax rate used when neither an override nor an estimate exists
pub const DEFAULT_PROPERTY_TAX_RATE: f64 = 0.012;

/// Property appreciation rate used when neither an override nor an estimate exists
pub const DEFAULT_APPRECIATION_RATE: f64 = 0.05;

/// Benchmark CAGR used when neither an override nor an estimate exists
pub const DEFAULT_STOCK_CAGR: f64 = 0.08;

/// Where a resolved rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Explicitly set on the configuration
    Override,
    /// Supplied by the estimation collaborator
    Estimated,
    /// Hardcoded fallback
    Default,
}

/// A resolved annual rate and its provenance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub value: f64,
    pub source: RateSource,
}

impl ResolvedRate {
    fn pick(override_value: Option<f64>, estimate: Option<f64>, default: f64) -> Self {
        if let Some(value) = override_value.filter(|v| v.is_finite()) {
            return Self { value, source: RateSource::Override };
        }
        if let Some(value) = estimate.filter(|v| v.is_finite()) {
            return Self { value, source: RateSource::Estimated };
        }
        Self { value: default, source: RateSource::Default }
    }
}

/// Annual rates for one run plus pass-through descriptive metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSet {
    pub property_tax_rate_annual: ResolvedRate,
    pub property_appreciation_rate_annual: ResolvedRate,
    pub stock_cagr_annual: ResolvedRate,

    /// Location label from the estimate, untouched
    pub location_label: Option<String>,

    /// Narrative text from the estimate, untouched
    pub narrative: Option<String>,

    /// Data source description from the estimate, untouched
    pub data_source: Option<String>,
}

impl RateSet {
    pub fn property_tax_rate(&self) -> f64 {
        self.property_tax_rate_annual.value
    }

    pub fn appreciation_rate(&self) -> f64 {
        self.property_appreciation_rate_annual.value
    }

    pub fn stock_cagr(&self) -> f64 {
        self.stock_cagr_annual.value
    }

    /// Growth rates must compound to a real monthly rate
    pub fn validate(&self) -> Result<(), ProjectionError> {
        let growth = [
            ("property_appreciation_rate_annual", self.appreciation_rate()),
            ("stock_cagr_annual", self.stock_cagr()),
        ];
        for (name, value) in growth {
            if !value.is_finite() || value <= -1.0 {
                return Err(ProjectionError::InvalidRate { name, value });
            }
        }
        let tax = self.property_tax_rate();
        if !tax.is_finite() || tax < 0.0 {
            return Err(ProjectionError::InvalidRate {
                name: "property_tax_rate_annual",
                value: tax,
            });
        }
        Ok(())
    }
}

/// Resolve rates: explicit override, then estimate, then default
///
/// Never fails; absent or non-finite values fall through to the next source.
pub fn resolve(config: &InvestmentConfiguration, estimated: Option<&EstimatedRates>) -> RateSet {
    let empty = EstimatedRates::default();
    let estimated = estimated.unwrap_or(&empty);

    let rates = RateSet {
        property_tax_rate_annual: ResolvedRate::pick(
            config.property_tax_rate_annual,
            estimated.property_tax_rate_annual,
            DEFAULT_PROPERTY_TAX_RATE,
        ),
        property_appreciation_rate_annual: ResolvedRate::pick(
            config.property_appreciation_rate_annual,
            estimated.property_appreciation_rate_annual,
            DEFAULT_APPRECIATION_RATE,
        ),
        stock_cagr_annual: ResolvedRate::pick(
            config.stock_cagr_annual,
            estimated.stock_cagr_annual,
            DEFAULT_STOCK_CAGR,
        ),
        location_label: estimated.location_label.clone(),
        narrative: estimated.narrative.clone(),
        data_source: estimated.data_source.clone(),
    };

    debug!(
        "Resolved rates: tax={} ({:?}) appreciation={} ({:?}) stock={} ({:?})",
        rates.property_tax_rate(),
        rates.property_tax_rate_annual.source,
        rates.appreciation_rate(),
        rates.property_appreciation_rate_annual.source,
        rates.stock_cagr(),
        rates.stock_cagr_annual.source,
    );

    rates
}
