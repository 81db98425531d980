//! Entry point tying rule lookup and settings to the calculators.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calculations::{
    GrossIncomeSolution, ProgressiveTaxCalculator, RegimeComparator, ReverseGrossIncomeSolver,
    YearEndProjectionEstimator,
};
use crate::models::{
    FiscalYear, FiscalYearError, IncomeAggregate, ProjectionResult, Regime,
    RegimeComparisonResult, TaxBreakdown,
};
use crate::rules::{RuleProvider, TaxRuleError, TaxRuleRegistry};
use crate::settings::EngineSettings;

/// Stateless facade over a rule source and engine settings.
///
/// `regime` arguments are optional; `None` falls back to the configured
/// default regime.
#[derive(Debug, Clone)]
pub struct TaxEngine<P: RuleProvider = TaxRuleRegistry> {
    rules: P,
    settings: EngineSettings,
}

impl Default for TaxEngine {
    fn default() -> Self {
        Self::new(TaxRuleRegistry::builtin(), EngineSettings::default())
    }
}

impl<P: RuleProvider> TaxEngine<P> {
    pub fn new(
        rules: P,
        settings: EngineSettings,
    ) -> Self {
        Self { rules, settings }
    }

    pub fn rules(&self) -> &P {
        &self.rules
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The fiscal year containing `date` under the configured start month.
    pub fn fiscal_year_of(
        &self,
        date: NaiveDate,
    ) -> Result<FiscalYear, FiscalYearError> {
        FiscalYear::containing(date, self.settings.fiscal_year_start_month)
    }

    /// Regimes that can be offered for the year, old first.
    pub fn available_regimes(
        &self,
        fiscal_year_start: i32,
    ) -> Vec<Regime> {
        [Regime::Old, Regime::New]
            .into_iter()
            .filter(|&regime| self.rules.is_available(fiscal_year_start, regime))
            .collect()
    }

    pub fn tax(
        &self,
        fiscal_year_start: i32,
        regime: Option<Regime>,
        gross_income: Decimal,
        salary_months_count: u32,
    ) -> Result<TaxBreakdown, TaxRuleError> {
        let config = self.rules.config(fiscal_year_start, self.settings.regime_or_default(regime))?;
        Ok(ProgressiveTaxCalculator::new(&config).calculate(
            gross_income,
            salary_months_count > 0,
            salary_months_count,
        ))
    }

    pub fn gross_from_net(
        &self,
        fiscal_year_start: i32,
        regime: Option<Regime>,
        net_received: Decimal,
        salary_months_count: u32,
    ) -> Result<GrossIncomeSolution, TaxRuleError> {
        let config = self.rules.config(fiscal_year_start, self.settings.regime_or_default(regime))?;
        Ok(
            ReverseGrossIncomeSolver::new(&config, self.settings.solver.clone()).solve(
                net_received,
                salary_months_count > 0,
                salary_months_count,
            ),
        )
    }

    /// Year-end projection for `fiscal_year` as seen on `today`.
    pub fn project(
        &self,
        fiscal_year: &FiscalYear,
        regime: Option<Regime>,
        aggregate: &IncomeAggregate,
        today: NaiveDate,
    ) -> Result<ProjectionResult, TaxRuleError> {
        let config = self.rules.config(
            fiscal_year.start_year(),
            self.settings.regime_or_default(regime),
        )?;
        Ok(
            YearEndProjectionEstimator::new(&config, self.settings.solver.clone())
                .project_as_of(aggregate, fiscal_year, today),
        )
    }

    pub fn compare(
        &self,
        fiscal_year_start: i32,
        gross_income: Decimal,
        standard_deduction: Option<Decimal>,
        salary_months_count: u32,
    ) -> Result<RegimeComparisonResult, TaxRuleError> {
        RegimeComparator::new(&self.rules, self.settings.comparator.clone()).compare(
            gross_income,
            fiscal_year_start,
            standard_deduction,
            salary_months_count,
        )
    }
}
