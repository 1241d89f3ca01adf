//! Monthly compounding of the liquid-asset and property tracks

/// Monthly rate equivalent to an annual rate under compounding: (1+r)^(1/12) - 1
pub fn monthly_equivalent_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Grow both tracks by one month
///
/// Returns (new_stock_value, new_property_asset_value).
pub fn advance_growth(
    stock_value: f64,
    property_asset_value: f64,
    monthly_stock_rate: f64,
    monthly_property_rate: f64,
) -> (f64, f64) {
    (
        stock_value * (1.0 + monthly_stock_rate),
        property_asset_value * (1.0 + monthly_property_rate),
    )
}
