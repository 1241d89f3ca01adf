//! Rate estimates supplied by an external analysis collaborator

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Optional rate estimates; any field may be missing
///
/// Numeric fields accept JSON numbers or numeric strings. Anything else
/// (wrong type, NaN, infinity) is treated as absent rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatedRates {
    #[serde(deserialize_with = "lenient_rate", alias = "propertyTaxRate")]
    pub property_tax_rate_annual: Option<f64>,

    #[serde(deserialize_with = "lenient_rate", alias = "propertyAppreciationRate")]
    pub property_appreciation_rate_annual: Option<f64>,

    #[serde(deserialize_with = "lenient_rate", alias = "stockCAGR")]
    pub stock_cagr_annual: Option<f64>,

    #[serde(alias = "locationName")]
    pub location_label: Option<String>,

    #[serde(alias = "marketVibe")]
    pub narrative: Option<String>,

    #[serde(alias = "stockDataSource")]
    pub data_source: Option<String>,
}

impl EstimatedRates {
    /// True when no rate field carries a usable value
    pub fn is_empty(&self) -> bool {
        self.property_tax_rate_annual.is_none()
            && self.property_appreciation_rate_annual.is_none()
            && self.stock_cagr_annual.is_none()
    }
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let rate = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    if rate.is_none() && !value.is_null() {
        log::warn!("Ignoring malformed rate estimate: {}", value);
    }
    Ok(rate.filter(|r| r.is_finite()))
}
