//! Rent or Invest CLI
//!
//! Command-line interface for projecting a property purchase against an index investment

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use rent_or_invest::config::{apply_env_overrides, load_configuration, load_estimated_rates};
use rent_or_invest::projection::{ProjectionEngine, ProjectionResult, ProjectionSummary, TaxView, Winner};
use rent_or_invest::rates::RateSource;
use rent_or_invest::InvestmentConfiguration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ViewArg {
    Pre,
    After,
}

impl From<ViewArg> for TaxView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Pre => TaxView::PreTax,
            ViewArg::After => TaxView::AfterTax,
        }
    }
}

/// Compare buying a mortgaged property with investing the down payment in an index
#[derive(Debug, Parser)]
#[command(name = "rent-or-invest", version)]
struct Cli {
    /// JSON configuration file (missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON rate estimates from an external analysis step
    #[arg(long)]
    rates: Option<PathBuf>,

    #[arg(long)]
    purchase_price: Option<f64>,

    /// Down payment in percent of the purchase price
    #[arg(long)]
    down_payment: Option<f64>,

    /// Mortgage rate in percent
    #[arg(long)]
    interest_rate: Option<f64>,

    #[arg(long)]
    loan_term: Option<u32>,

    #[arg(long)]
    horizon: Option<u32>,

    #[arg(long)]
    hoa_monthly: Option<f64>,

    #[arg(long)]
    insurance_annual: Option<f64>,

    /// Annual maintenance as a fraction of property value
    #[arg(long)]
    maintenance_rate: Option<f64>,

    /// Property tax rate override (fraction)
    #[arg(long)]
    property_tax_rate: Option<f64>,

    /// Appreciation rate override (fraction)
    #[arg(long)]
    appreciation_rate: Option<f64>,

    /// Benchmark CAGR override (fraction)
    #[arg(long)]
    stock_cagr: Option<f64>,

    #[arg(long)]
    start_year: Option<i32>,

    /// Which values to display
    #[arg(long, value_enum, default_value = "pre")]
    view: ViewArg,

    /// Write yearly snapshots as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the full amortization schedule as CSV
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut InvestmentConfiguration) {
        if let Some(v) = self.purchase_price {
            config.purchase_price = v;
        }
        if let Some(v) = self.down_payment {
            config.down_payment_percent = v;
        }
        if let Some(v) = self.interest_rate {
            config.annual_interest_rate_percent = v;
        }
        if let Some(v) = self.loan_term {
            config.loan_term_years = v;
        }
        if let Some(v) = self.horizon {
            config.horizon_years = v;
        }
        if let Some(v) = self.hoa_monthly {
            config.hoa_monthly = v;
        }
        if let Some(v) = self.insurance_annual {
            config.insurance_annual = v;
        }
        if let Some(v) = self.maintenance_rate {
            config.maintenance_rate_annual = v;
        }
        if self.property_tax_rate.is_some() {
            config.property_tax_rate_annual = self.property_tax_rate;
        }
        if self.appreciation_rate.is_some() {
            config.property_appreciation_rate_annual = self.appreciation_rate;
        }
        if self.stock_cagr.is_some() {
            config.stock_cagr_annual = self.stock_cagr;
        }
        if let Some(v) = self.start_year {
            config.start_year = v;
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a InvestmentConfiguration,
    result: &'a ProjectionResult,
    summary: Option<ProjectionSummary>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_configuration(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => InvestmentConfiguration::default(),
    };
    apply_env_overrides(&mut config);
    cli.apply_to(&mut config);

    let estimated = cli
        .rates
        .as_ref()
        .map(|path| {
            load_estimated_rates(path)
                .with_context(|| format!("loading rate estimates from {}", path.display()))
        })
        .transpose()?;

    let engine = ProjectionEngine::from_estimates(config, estimated.as_ref())
        .context("configuration rejected")?;
    let result = engine.project(cli.view.into());

    if let Some(path) = &cli.csv {
        write_snapshots_csv(path, &result)?;
    }
    if let Some(path) = &cli.schedule {
        write_schedule_csv(path, &engine)?;
    }

    if cli.json {
        let report = Report {
            config: engine.config(),
            result: &result,
            summary: result.summary(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&engine, &result);

    if let Some(path) = &cli.csv {
        println!("\nSnapshots written to: {}", path.display());
    }
    if let Some(path) = &cli.schedule {
        println!("Amortization schedule written to: {}", path.display());
    }

    Ok(())
}

fn write_snapshots_csv(path: &Path, result: &ProjectionResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for snapshot in &result.snapshots {
        writer.serialize(snapshot)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_schedule_csv(path: &Path, engine: &ProjectionEngine) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in engine.loan().schedule() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn source_label(source: RateSource) -> &'static str {
    match source {
        RateSource::Override => "override",
        RateSource::Estimated => "estimated",
        RateSource::Default => "default",
    }
}

fn print_report(engine: &ProjectionEngine, result: &ProjectionResult) {
    let config = engine.config();
    let rates = &result.rates;
    let view = result.tax_view;

    println!("Rent or Invest v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    println!(
        "{} vs. {}",
        rates.location_label.as_deref().unwrap_or("Property"),
        config.benchmark
    );
    println!("  Purchase Price:   ${:.2}", config.purchase_price);
    println!("  Initial Capital:  ${:.2}", engine.initial_capital());
    println!("  Loan Principal:   ${:.2}", engine.loan().principal);
    println!("  Monthly Payment:  ${:.2}", result.monthly_payment);
    println!(
        "  Stock CAGR:       {:.2}% ({})",
        rates.stock_cagr() * 100.0,
        source_label(rates.stock_cagr_annual.source)
    );
    println!(
        "  Appreciation:     {:.2}% ({})",
        rates.appreciation_rate() * 100.0,
        source_label(rates.property_appreciation_rate_annual.source)
    );
    println!(
        "  Property Tax:     {:.2}% ({})",
        rates.property_tax_rate() * 100.0,
        source_label(rates.property_tax_rate_annual.source)
    );
    if let Some(narrative) = &rates.narrative {
        println!("  Notes:            {}", narrative);
    }
    println!();

    let heading = match view {
        TaxView::PreTax => "Total Equity Value",
        TaxView::AfterTax => "Net Liquidation Value",
    };
    println!("{} ({} years):", heading, result.snapshots.len().saturating_sub(1));
    println!(
        "{:>6} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "Year", "Stock", "Property", "Loan", "Cum Tax", "Cum Costs"
    );
    println!("{}", "-".repeat(81));

    for s in &result.snapshots {
        println!(
            "{:>6} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            s.year_label,
            s.stock_value(view),
            s.property_value(view),
            s.loan_balance,
            s.cumulative_property_tax,
            s.cumulative_carrying_costs,
        );
    }

    let Some(summary) = result.summary() else {
        return;
    };

    let winner = match summary.winner {
        Winner::Stock => config.benchmark.as_str(),
        Winner::Property => "Property",
    };

    println!("\nSummary:");
    println!("  Winner:              {} (${:.2})", winner, summary.winner_value());
    match summary.outperformance_percent {
        Some(pct) => println!("  Outperformance:      +{:.1}%", pct),
        None => println!("  Outperformance:      n/a"),
    }
    println!("  Difference:          ${:.2}", summary.difference);
    if let Some(pct) = summary.winner_total_return_percent {
        println!("  Total Return:        {:.1}% vs initial", pct);
    }
    println!("  Year 1 Property Tax: ${:.2}", summary.first_year_property_tax);
    println!("  Total Property Tax:  ${:.2}", summary.total_property_tax);
    println!("  Total Interest:      ${:.2}", summary.total_mortgage_interest);
    println!("  Total Carrying Cost: ${:.2}", summary.total_carrying_costs);
    if let Some(pct) = summary.tax_drag_percent {
        println!("  Tax Drag:            {:.1}% of equity", pct);
    }
}
