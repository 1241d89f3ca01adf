//! Load configuration and rate estimates from JSON files and environment variables

use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};

use super::InvestmentConfiguration;
use crate::error::LoadError;
use crate::rates::EstimatedRates;

/// Load a configuration from a JSON file; missing fields take their defaults
pub fn load_configuration<P: AsRef<Path>>(path: P) -> Result<InvestmentConfiguration, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_json(BufReader::new(file), &path.display().to_string())?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Load a configuration from any reader (e.g. stdin, string buffer)
pub fn load_configuration_from_reader<R: Read>(reader: R) -> Result<InvestmentConfiguration, LoadError> {
    parse_json(reader, "configuration")
}

/// Load a configuration, apply environment overrides and validate the result
pub fn load_validated_configuration<P: AsRef<Path>>(path: P) -> Result<InvestmentConfiguration, LoadError> {
    let mut config = load_configuration(path)?;
    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Load rate estimates produced by an external analysis step
pub fn load_estimated_rates<P: AsRef<Path>>(path: P) -> Result<EstimatedRates, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rates = parse_estimated_rates(BufReader::new(file), &path.display().to_string())?;
    debug!("Loaded rate estimates from {}", path.display());
    Ok(rates)
}

fn parse_estimated_rates<R: Read>(reader: R, context: &str) -> Result<EstimatedRates, LoadError> {
    let rates: EstimatedRates = parse_json(reader, context)?;
    if rates.is_empty() {
        warn!("{} carries no usable rate estimates; defaults apply", context);
    }
    Ok(rates)
}

fn parse_json<T, R>(reader: R, context: &str) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
    R: Read,
{
    serde_json::from_reader(reader).map_err(|source| LoadError::Parse {
        context: context.to_string(),
        source,
    })
}

/// Apply overrides from process environment variables
///
/// Recognised: PURCHASE_PRICE, DOWN_PAYMENT_PERCENT, INTEREST_RATE_PERCENT,
/// LOAN_TERM_YEARS, HOA_MONTHLY, INSURANCE_ANNUAL, MAINTENANCE_RATE,
/// PROPERTY_TAX_RATE, APPRECIATION_RATE, STOCK_CAGR, HORIZON_YEARS,
/// CAPITAL_GAINS_TAX_RATE, START_YEAR, BENCHMARK
pub fn apply_env_overrides(config: &mut InvestmentConfiguration) {
    apply_overrides_from(config, |name| env::var(name).ok());
}

/// Apply overrides from an arbitrary variable lookup
pub fn apply_overrides_from<F>(config: &mut InvestmentConfiguration, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let parsed = |name: &str| lookup(name).and_then(|raw| parse_var(name, &raw));

    if let Some(v) = parsed("PURCHASE_PRICE") {
        config.purchase_price = v;
    }
    if let Some(v) = parsed("DOWN_PAYMENT_PERCENT") {
        config.down_payment_percent = v;
    }
    if let Some(v) = parsed("INTEREST_RATE_PERCENT") {
        config.annual_interest_rate_percent = v;
    }
    if let Some(v) = lookup("LOAN_TERM_YEARS").and_then(|raw| parse_var("LOAN_TERM_YEARS", &raw)) {
        config.loan_term_years = v;
    }
    if let Some(v) = parsed("HOA_MONTHLY") {
        config.hoa_monthly = v;
    }
    if let Some(v) = parsed("INSURANCE_ANNUAL") {
        config.insurance_annual = v;
    }
    if let Some(v) = parsed("MAINTENANCE_RATE") {
        config.maintenance_rate_annual = v;
    }
    if let Some(v) = parsed("PROPERTY_TAX_RATE") {
        config.property_tax_rate_annual = Some(v);
    }
    if let Some(v) = parsed("APPRECIATION_RATE") {
        config.property_appreciation_rate_annual = Some(v);
    }
    if let Some(v) = parsed("STOCK_CAGR") {
        config.stock_cagr_annual = Some(v);
    }
    if let Some(v) = lookup("HORIZON_YEARS").and_then(|raw| parse_var("HORIZON_YEARS", &raw)) {
        config.horizon_years = v;
    }
    if let Some(v) = parsed("CAPITAL_GAINS_TAX_RATE") {
        config.capital_gains_tax_rate = v;
    }
    if let Some(v) = lookup("START_YEAR").and_then(|raw| parse_var("START_YEAR", &raw)) {
        config.start_year = v;
    }
    if let Some(v) = lookup("BENCHMARK") {
        config.benchmark = v;
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", name, raw);
            None
        }
    }
}
