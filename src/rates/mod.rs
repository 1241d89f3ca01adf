//! Annual rate resolution: overrides, external estimates and defaults

mod estimates;
mod resolver;

pub use estimates::EstimatedRates;
pub use resolver::{
    resolve, RateSet, RateSource, ResolvedRate, DEFAULT_APPRECIATION_RATE,
    DEFAULT_PROPERTY_TAX_RATE, DEFAULT_STOCK_CAGR,
};
