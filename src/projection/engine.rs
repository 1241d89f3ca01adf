//! Month-by-month projection engine with yearly sampling

use log::{debug, trace};

use super::amortization::LoanTerms;
use super::costs::{MonthlyCarryingCosts, TaxView};
use super::growth::{advance_growth, monthly_equivalent_rate};
use super::snapshots::{ProjectionResult, Snapshot};
use super::state::SimulationState;
use crate::config::InvestmentConfiguration;
use crate::error::ProjectionError;
use crate::rates::{resolve, EstimatedRates, RateSet};

/// Main projection engine
///
/// Holds validated inputs and the per-run constants derived from them. Running
/// a projection is a pure, synchronous fold over months: identical inputs give
/// bit-identical results.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: InvestmentConfiguration,
    rates: RateSet,
    loan: LoanTerms,
    monthly_stock_rate: f64,
    monthly_property_rate: f64,
}

impl ProjectionEngine {
    /// Create an engine from a configuration and already-resolved rates
    pub fn new(config: InvestmentConfiguration, rates: RateSet) -> Result<Self, ProjectionError> {
        config.validate()?;
        rates.validate()?;

        let loan = LoanTerms::new(
            config.loan_principal(),
            config.annual_interest_rate_percent,
            config.loan_term_years,
        );
        debug!(
            "Loan: principal={:.2} rate={}% term={} months payment={:.2}",
            loan.principal, config.annual_interest_rate_percent, loan.term_months, loan.monthly_payment
        );

        Ok(Self {
            monthly_stock_rate: monthly_equivalent_rate(rates.stock_cagr()),
            monthly_property_rate: monthly_equivalent_rate(rates.appreciation_rate()),
            config,
            rates,
            loan,
        })
    }

    /// Resolve rates against optional estimates, then create the engine
    pub fn from_estimates(
        config: InvestmentConfiguration,
        estimated: Option<&EstimatedRates>,
    ) -> Result<Self, ProjectionError> {
        let rates = resolve(&config, estimated);
        Self::new(config, rates)
    }

    pub fn config(&self) -> &InvestmentConfiguration {
        &self.config
    }

    pub fn rates(&self) -> &RateSet {
        &self.rates
    }

    pub fn loan(&self) -> &LoanTerms {
        &self.loan
    }

    /// Capital both tracks start from
    pub fn initial_capital(&self) -> f64 {
        self.config.down_payment()
    }

    pub fn total_months(&self) -> u32 {
        self.config.total_months()
    }

    /// State at month 0
    pub fn initial_state(&self) -> SimulationState {
        SimulationState::initial(&self.config)
    }

    /// Advance one month: growth, then amortization, then carrying costs
    pub fn advance_month(&self, state: SimulationState) -> SimulationState {
        let (stock_value, property_asset_value) = advance_growth(
            state.stock_value,
            state.property_asset_value,
            self.monthly_stock_rate,
            self.monthly_property_rate,
        );

        let (loan_balance, interest) =
            if state.loan_balance > 0.0 && state.month_index < self.loan.term_months {
                self.loan.advance_month(state.loan_balance, state.month_index)
            } else {
                (state.loan_balance.max(0.0), 0.0)
            };

        let costs = MonthlyCarryingCosts::accrue(
            property_asset_value,
            self.rates.property_tax_rate(),
            self.config.insurance_annual,
            self.config.maintenance_rate_annual,
            self.config.hoa_monthly,
            interest,
        );

        SimulationState {
            month_index: state.month_index + 1,
            stock_value,
            property_asset_value,
            loan_balance,
            cumulative_property_tax: state.cumulative_property_tax + costs.property_tax,
            cumulative_carrying_costs: state.cumulative_carrying_costs + costs.total(),
            cumulative_mortgage_interest: state.cumulative_mortgage_interest + interest,
        }
    }

    /// Snapshot of `state`, valued both pre- and after-tax
    pub fn snapshot(&self, state: &SimulationState) -> Snapshot {
        Snapshot::capture(
            state,
            self.initial_capital(),
            self.config.capital_gains_tax_rate,
            self.rates.property_tax_rate(),
            self.config.start_year,
        )
    }

    /// Lazily yields one snapshot per year, starting with month 0
    pub fn sampler(&self) -> SnapshotSampler<'_> {
        SnapshotSampler {
            engine: self,
            phase: SamplerPhase::NotStarted,
        }
    }

    /// Run the full horizon
    pub fn project(&self, tax_view: TaxView) -> ProjectionResult {
        let mut result = ProjectionResult::new(tax_view, self.rates.clone(), self.loan.monthly_payment);
        for snapshot in self.sampler() {
            result.add_snapshot(snapshot);
        }
        result
    }
}

/// Resolve rates and project in one call
pub fn project(
    config: InvestmentConfiguration,
    estimated: Option<&EstimatedRates>,
    tax_view: TaxView,
) -> Result<ProjectionResult, ProjectionError> {
    Ok(ProjectionEngine::from_estimates(config, estimated)?.project(tax_view))
}

#[derive(Debug, Clone)]
enum SamplerPhase {
    NotStarted,
    Running(SimulationState),
    Completed,
}

/// Iterator over yearly snapshots of a projection
#[derive(Debug, Clone)]
pub struct SnapshotSampler<'a> {
    engine: &'a ProjectionEngine,
    phase: SamplerPhase,
}

impl SnapshotSampler<'_> {
    fn finish_or_continue(&self, state: SimulationState) -> SamplerPhase {
        if state.month_index >= self.engine.total_months() {
            SamplerPhase::Completed
        } else {
            SamplerPhase::Running(state)
        }
    }

    fn remaining(&self) -> usize {
        let total_years = (self.engine.total_months() / 12) as usize;
        match &self.phase {
            SamplerPhase::NotStarted => total_years + 1,
            SamplerPhase::Running(state) => total_years - state.year_index() as usize,
            SamplerPhase::Completed => 0,
        }
    }
}

impl Iterator for SnapshotSampler<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        let state = match std::mem::replace(&mut self.phase, SamplerPhase::Completed) {
            SamplerPhase::NotStarted => self.engine.initial_state(),
            SamplerPhase::Running(mut state) => {
                loop {
                    state = self.engine.advance_month(state);
                    if state.is_year_boundary() || state.month_index >= self.engine.total_months() {
                        break;
                    }
                }
                state
            }
            SamplerPhase::Completed => return None,
        };

        let snapshot = self.engine.snapshot(&state);
        trace!(
            "Year {}: stock={:.2} equity={:.2} loan={:.2} costs={:.2}",
            snapshot.year_index,
            snapshot.stock_pre_tax,
            snapshot.property_equity,
            snapshot.loan_balance,
            snapshot.cumulative_carrying_costs
        );

        self.phase = self.finish_or_continue(state);
        Some(snapshot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SnapshotSampler<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Winner;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// 450k purchase, 20% down, 6.5% for 30 years, 15-year horizon
    fn reference_config() -> InvestmentConfiguration {
        InvestmentConfiguration {
            purchase_price: 450_000.0,
            down_payment_percent: 20.0,
            annual_interest_rate_percent: 6.5,
            loan_term_years: 30,
            hoa_monthly: 0.0,
            insurance_annual: 1_200.0,
            maintenance_rate_annual: 0.01,
            property_tax_rate_annual: Some(0.012),
            property_appreciation_rate_annual: Some(0.05),
            stock_cagr_annual: Some(0.08),
            horizon_years: 15,
            capital_gains_tax_rate: 0.15,
            benchmark: "SPY".to_string(),
            start_year: 2024,
        }
    }

    fn run(config: InvestmentConfiguration, view: TaxView) -> ProjectionResult {
        project(config, None, view).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let engine = ProjectionEngine::from_estimates(reference_config(), None).unwrap();
        assert_eq!(engine.initial_capital(), 90_000.0);
        assert_eq!(engine.loan().principal, 360_000.0);

        let result = engine.project(TaxView::PreTax);
        let first = &result.snapshots[0];
        assert_eq!(first.year_label, "2024");
        assert_eq!(first.stock_pre_tax, 90_000.0);
        assert_eq!(first.property_pre_tax, 90_000.0);
        assert_eq!(first.stock_after_tax, first.property_after_tax);

        let last = result.final_snapshot().unwrap();
        assert_eq!(last.year_label, "2039");
        assert_relative_eq!(last.stock_pre_tax, 90_000.0 * 1.08f64.powi(15), max_relative = 1e-9);
        assert!(last.stock_pre_tax > 285_000.0 && last.stock_pre_tax < 286_000.0);
    }

    #[test]
    fn test_determinism() {
        let a = run(reference_config(), TaxView::AfterTax);
        let b = run(reference_config(), TaxView::AfterTax);
        assert_eq!(a, b);
        for (x, y) in a.snapshots.iter().zip(&b.snapshots) {
            assert_eq!(x.property_after_tax.to_bits(), y.property_after_tax.to_bits());
        }
    }

    #[test]
    fn test_snapshot_count() {
        for horizon in [1, 5, 15, 40] {
            let config = InvestmentConfiguration {
                horizon_years: horizon,
                ..reference_config()
            };
            let engine = ProjectionEngine::from_estimates(config, None).unwrap();
            assert_eq!(engine.sampler().len(), horizon as usize + 1);

            let result = engine.project(TaxView::PreTax);
            assert_eq!(result.snapshots.len(), horizon as usize + 1);
            for (i, s) in result.snapshots.iter().enumerate() {
                assert_eq!(s.year_index as usize, i);
                assert_eq!(s.month_index as usize, i * 12);
            }
        }
    }

    #[test]
    fn test_loan_floor_and_payoff() {
        let config = InvestmentConfiguration {
            loan_term_years: 10,
            horizon_years: 12,
            ..reference_config()
        };
        let result = run(config, TaxView::PreTax);

        assert!(result.snapshots.iter().all(|s| s.loan_balance >= 0.0));
        assert_abs_diff_eq!(result.snapshots[10].loan_balance, 0.0, epsilon = 1e-6);

        // No interest accrues once the term has ended
        let at_term = result.snapshots[10].cumulative_mortgage_interest;
        assert_eq!(result.snapshots[12].cumulative_mortgage_interest, at_term);
    }

    #[test]
    fn test_property_value_strictly_increasing() {
        let result = run(reference_config(), TaxView::PreTax);
        for pair in result.snapshots.windows(2) {
            assert!(pair[1].property_asset_value > pair[0].property_asset_value);
        }
    }

    #[test]
    fn test_cumulative_tax_non_decreasing() {
        let result = run(reference_config(), TaxView::AfterTax);
        for pair in result.snapshots.windows(2) {
            assert!(pair[1].cumulative_property_tax >= pair[0].cumulative_property_tax);
            assert!(pair[1].cumulative_carrying_costs >= pair[0].cumulative_carrying_costs);
        }
    }

    #[test]
    fn test_pre_tax_stock_at_least_after_tax() {
        let result = run(reference_config(), TaxView::PreTax);
        for s in &result.snapshots {
            assert!(s.stock_pre_tax >= s.stock_after_tax);
        }
        let last = result.final_snapshot().unwrap();
        assert!(last.stock_pre_tax > last.stock_after_tax);
    }

    #[test]
    fn test_zero_interest_rate() {
        let config = InvestmentConfiguration {
            annual_interest_rate_percent: 0.0,
            ..reference_config()
        };
        let engine = ProjectionEngine::from_estimates(config, None).unwrap();
        assert_eq!(engine.loan().monthly_payment, 360_000.0 / 360.0);

        let result = engine.project(TaxView::PreTax);
        assert!(result.snapshots.iter().all(|s| s.cumulative_mortgage_interest == 0.0));
        assert_abs_diff_eq!(
            result.final_snapshot().unwrap().loan_balance,
            360_000.0 - 1_000.0 * 180.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_all_cash_purchase() {
        let config = InvestmentConfiguration {
            down_payment_percent: 100.0,
            ..reference_config()
        };
        let engine = ProjectionEngine::from_estimates(config, None).unwrap();
        assert_eq!(engine.loan().monthly_payment, 0.0);

        let result = engine.project(TaxView::PreTax);
        for s in &result.snapshots {
            assert_eq!(s.loan_balance, 0.0);
            assert_eq!(s.cumulative_mortgage_interest, 0.0);
            assert_eq!(s.property_equity, s.property_asset_value);
        }
        assert_eq!(result.snapshots[0].stock_pre_tax, 450_000.0);
    }

    #[test]
    fn test_all_cash_non_round_price_has_no_loan() {
        let config = InvestmentConfiguration {
            purchase_price: 1_352_298.798_682_888_3,
            down_payment_percent: 100.0,
            ..reference_config()
        };
        let engine = ProjectionEngine::from_estimates(config, None).unwrap();
        assert_eq!(engine.loan().principal, 0.0);
        assert_eq!(engine.loan().monthly_payment, 0.0);

        let result = engine.project(TaxView::AfterTax);
        for s in &result.snapshots {
            assert_eq!(s.loan_balance, 0.0);
            assert_eq!(s.cumulative_mortgage_interest, 0.0);
        }
    }

    #[test]
    fn test_oversized_term_is_rejected_not_panicking() {
        let config = InvestmentConfiguration {
            loan_term_years: 400_000_000,
            ..reference_config()
        };
        assert!(matches!(
            ProjectionEngine::from_estimates(config, None),
            Err(ProjectionError::InvalidConfiguration { field: "loan_term_years", .. })
        ));
    }

    #[test]
    fn test_flat_markets() {
        let config = InvestmentConfiguration {
            down_payment_percent: 100.0,
            property_appreciation_rate_annual: Some(0.0),
            stock_cagr_annual: Some(0.0),
            ..reference_config()
        };
        let result = run(config, TaxView::AfterTax);

        for s in &result.snapshots {
            assert_eq!(s.stock_pre_tax, 450_000.0);
            assert_eq!(s.property_pre_tax, 450_000.0);
        }
        for pair in result.snapshots.windows(2) {
            assert!(pair[1].property_after_tax < pair[0].property_after_tax);
        }
    }

    #[test]
    fn test_flat_markets_with_mortgage() {
        let config = InvestmentConfiguration {
            property_appreciation_rate_annual: Some(0.0),
            stock_cagr_annual: Some(0.0),
            ..reference_config()
        };
        let result = run(config, TaxView::AfterTax);

        for s in &result.snapshots {
            assert_eq!(s.stock_pre_tax, 90_000.0);
            assert_eq!(s.property_asset_value, 450_000.0);
        }
        for pair in result.snapshots.windows(2) {
            assert!(pair[1].property_after_tax < pair[0].property_after_tax);
        }
    }

    #[test]
    fn test_first_year_costs() {
        let config = InvestmentConfiguration {
            horizon_years: 1,
            property_appreciation_rate_annual: Some(0.0),
            hoa_monthly: 100.0,
            ..reference_config()
        };
        let engine = ProjectionEngine::from_estimates(config, None).unwrap();
        let result = engine.project(TaxView::AfterTax);
        let year1 = &result.snapshots[1];

        let principal_paid = 360_000.0 - year1.loan_balance;
        assert_relative_eq!(
            year1.loan_balance,
            engine.loan().balance_after(12),
            max_relative = 1e-12
        );
        let interest_paid = engine.loan().monthly_payment * 12.0 - principal_paid;
        assert_relative_eq!(year1.cumulative_mortgage_interest, interest_paid, max_relative = 1e-9);

        assert_relative_eq!(year1.cumulative_property_tax, 450_000.0 * 0.012, max_relative = 1e-9);
        let fixed = 450_000.0 * 0.012 + 1_200.0 + 450_000.0 * 0.01 + 100.0 * 12.0;
        assert_relative_eq!(
            year1.cumulative_carrying_costs,
            fixed + interest_paid,
            max_relative = 1e-9
        );
        assert_relative_eq!(year1.annual_property_tax, 450_000.0 * 0.012, max_relative = 1e-12);
    }

    #[test]
    fn test_view_toggle_needs_no_resimulation() {
        let pre = run(reference_config(), TaxView::PreTax);
        let after = run(reference_config(), TaxView::AfterTax);

        assert_eq!(pre.snapshots, after.snapshots);
        assert_eq!(pre.with_view(TaxView::AfterTax), after);

        let series = after.display_series();
        let last = after.final_snapshot().unwrap();
        assert_eq!(series.last().unwrap().1, last.stock_after_tax);
        assert_eq!(series.last().unwrap().2, last.property_after_tax);
    }

    #[test]
    fn test_summary_matches_final_snapshot() {
        let result = run(reference_config(), TaxView::AfterTax);
        let summary = result.summary().unwrap();
        let last = result.final_snapshot().unwrap();

        assert_eq!(summary.final_stock, last.stock_after_tax);
        assert_eq!(summary.final_property, last.property_after_tax);
        assert_eq!(summary.years, 15);
        assert_eq!(summary.initial_capital, 90_000.0);
        assert_eq!(summary.total_property_tax, last.cumulative_property_tax);

        let expected_winner = if last.stock_after_tax > last.property_after_tax {
            Winner::Stock
        } else {
            Winner::Property
        };
        assert_eq!(summary.winner, expected_winner);
    }

    #[test]
    fn test_estimates_feed_the_run() {
        let config = InvestmentConfiguration {
            stock_cagr_annual: None,
            ..reference_config()
        };
        let estimated = EstimatedRates {
            stock_cagr_annual: Some(0.11),
            ..Default::default()
        };
        let result = project(config, Some(&estimated), TaxView::PreTax).unwrap();
        let last = result.final_snapshot().unwrap();
        assert_relative_eq!(last.stock_pre_tax, 90_000.0 * 1.11f64.powi(15), max_relative = 1e-9);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let config = InvestmentConfiguration {
            horizon_years: 0,
            ..reference_config()
        };
        assert!(matches!(
            project(config, None, TaxView::PreTax),
            Err(ProjectionError::InvalidConfiguration { field: "horizon_years", .. })
        ));
    }

    #[test]
    fn test_sampler_is_lazy_and_exhausts() {
        let engine = ProjectionEngine::from_estimates(reference_config(), None).unwrap();
        let mut sampler = engine.sampler();
        assert_eq!(sampler.len(), 16);
        let first = sampler.next().unwrap();
        assert_eq!(first.month_index, 0);
        assert_eq!(sampler.len(), 15);
        assert_eq!(sampler.by_ref().count(), 15);
        assert!(sampler.next().is_none());
    }

    #[test]
    fn test_fold_over_months_matches_sampler() {
        let engine = ProjectionEngine::from_estimates(reference_config(), None).unwrap();
        let state = (0..engine.total_months()).fold(engine.initial_state(), |s, _| engine.advance_month(s));
        let via_fold = engine.snapshot(&state);
        let via_sampler = engine.sampler().last().unwrap();
        assert_eq!(via_fold, via_sampler);
    }
}
