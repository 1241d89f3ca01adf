//! Investment configuration and its loaders

mod data;
pub mod loader;

pub use data::{
    current_year, InvestmentConfiguration, DEFAULT_CAPITAL_GAINS_TAX_RATE, MAX_HORIZON_YEARS,
    MAX_LOAN_TERM_YEARS,
};
pub use loader::{
    apply_env_overrides, load_configuration, load_configuration_from_reader, load_estimated_rates,
    load_validated_configuration,
};
