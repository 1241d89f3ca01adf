//! Sweep stock CAGR x property appreciation and write summaries to CSV
//!
//! Uses the JSON configuration at CONFIG_PATH when set, otherwise defaults, with
//! environment overrides applied (see `config::loader::apply_env_overrides`).
//! Grid bounds come from
//! CAGR_MIN/CAGR_MAX/APPRECIATION_MIN/APPRECIATION_MAX/GRID_STEP.
//! Pass --after-tax to compare net liquidation values.

use std::env;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use rent_or_invest::config::{apply_env_overrides, load_validated_configuration};
use rent_or_invest::projection::{TaxView, Winner};
use rent_or_invest::{InvestmentConfiguration, ScenarioRunner};

#[derive(Debug, Serialize)]
struct GridRow {
    stock_cagr: f64,
    appreciation_rate: f64,
    final_stock: f64,
    final_property: f64,
    winner: Winner,
    outperformance_percent: Option<f64>,
    difference: f64,
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Most points allowed along one grid axis
const MAX_AXIS_POINTS: usize = 1_000;

/// Inclusive range from `min` to `max` in `step` increments
fn steps(min: f64, max: f64, step: f64) -> Result<Vec<f64>> {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) {
        bail!("grid bounds and step must be finite (min={}, max={}, step={})", min, max, step);
    }
    if step <= 0.0 || max < min {
        return Ok(vec![min]);
    }
    let count = ((max - min) / step + 1e-9).floor();
    if count >= MAX_AXIS_POINTS as f64 {
        bail!(
            "grid step {} over [{}, {}] exceeds {} points per axis",
            step, min, max, MAX_AXIS_POINTS
        );
    }
    Ok((0..=count as usize).map(|i| min + step * i as f64).collect())
}

fn main() -> Result<()> {
    env_logger::init();

    let after_tax = env::args().any(|arg| arg == "--after-tax");
    let view = if after_tax { TaxView::AfterTax } else { TaxView::PreTax };
    let start = Instant::now();

    let config = match env::var("CONFIG_PATH") {
        Ok(path) => load_validated_configuration(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        Err(_) => {
            let mut config = InvestmentConfiguration::default();
            apply_env_overrides(&mut config);
            config
        }
    };

    let step = env_f64("GRID_STEP", 0.01);
    let cagrs = steps(env_f64("CAGR_MIN", 0.04), env_f64("CAGR_MAX", 0.12), step)?;
    let appreciations = steps(
        env_f64("APPRECIATION_MIN", 0.0),
        env_f64("APPRECIATION_MAX", 0.08),
        step,
    )?;

    println!(
        "Running {} x {} grid over {} years ({:?})...",
        cagrs.len(),
        appreciations.len(),
        config.horizon_years,
        view
    );

    let runner = ScenarioRunner::new(config);
    let grid = runner
        .sensitivity_grid(&cagrs, &appreciations, view)
        .context("sensitivity run rejected")?;

    println!("Projections complete in {:?}", start.elapsed());

    let output_path = "rate_sensitivity.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {}", output_path))?;

    let mut stock_wins = 0;
    for point in &grid {
        if point.summary.winner == Winner::Stock {
            stock_wins += 1;
        }
        writer.serialize(GridRow {
            stock_cagr: point.stock_cagr,
            appreciation_rate: point.appreciation_rate,
            final_stock: point.summary.final_stock,
            final_property: point.summary.final_property,
            winner: point.summary.winner,
            outperformance_percent: point.summary.outperformance_percent,
            difference: point.summary.difference,
        })?;
    }
    writer.flush()?;

    println!("Output written to {}", output_path);
    println!("\nGrid Summary:");
    println!("  Cells:        {}", grid.len());
    println!("  Stock wins:   {}", stock_wins);
    println!("  Property wins: {}", grid.len() - stock_wins);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
