//! Old-versus-new regime comparison.
//!
//! Both regimes are evaluated on the same gross income, the old regime
//! assuming no deductions beyond its standard deduction. When the new regime
//! wins, the comparator searches for the smallest extra old-regime deduction
//! (on a fixed step grid) that brings the old regime level with it.
//!
//! Old-regime tax never rises as deductions grow, so the first qualifying
//! grid point is found by bisection over step indices. This returns the same
//! point a linear scan from zero would, at the same granularity.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::ProgressiveTaxCalculator;
use crate::calculations::common::clamp_money;
use crate::models::{Regime, RegimeComparisonResult, RegimeConfig};
use crate::rules::{RuleProvider, TaxRuleError};

/// Grid for the break-even deduction search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorOptions {
    pub step: Decimal,
    pub cap: Decimal,
}

impl Default for ComparatorOptions {
    fn default() -> Self {
        Self {
            step: Decimal::from(10_000),
            cap: Decimal::from(1_000_000),
        }
    }
}

impl ComparatorOptions {
    /// Number of grid steps between zero and the cap.
    fn step_count(&self) -> u64 {
        if self.step <= Decimal::ZERO || self.cap <= Decimal::ZERO {
            return 0;
        }
        (self.cap / self.step).floor().to_u64().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct RegimeComparator<'a, P: RuleProvider> {
    rules: &'a P,
    options: ComparatorOptions,
}

impl<'a, P: RuleProvider> RegimeComparator<'a, P> {
    pub fn new(
        rules: &'a P,
        options: ComparatorOptions,
    ) -> Self {
        Self { rules, options }
    }

    /// Compares the regimes for `gross_income` in the given fiscal year.
    ///
    /// `standard_deduction`, when given, replaces the table standard
    /// deduction of both regimes. Professional tax is included when there
    /// are salaried months.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRuleError`] if either regime has no rules for the year.
    pub fn compare(
        &self,
        gross_income: Decimal,
        fiscal_year_start: i32,
        standard_deduction: Option<Decimal>,
        salary_months_count: u32,
    ) -> Result<RegimeComparisonResult, TaxRuleError> {
        let gross_income = clamp_money(gross_income);
        let new_config = self.config(fiscal_year_start, Regime::New, standard_deduction)?;
        let old_config = self.config(fiscal_year_start, Regime::Old, standard_deduction)?;
        let apply_professional_tax = salary_months_count > 0;

        let new_regime_tax = ProgressiveTaxCalculator::new(&new_config)
            .calculate(gross_income, apply_professional_tax, salary_months_count)
            .total_tax;
        let old = ProgressiveTaxCalculator::new(&old_config);
        let old_tax_with = |deduction: Decimal| {
            old.calculate(
                clamp_money(gross_income - deduction),
                apply_professional_tax,
                salary_months_count,
            )
            .total_tax
        };
        let old_regime_tax = old_tax_with(Decimal::ZERO);

        let (better_regime, break_even_deduction) = if new_regime_tax <= old_regime_tax {
            (
                Regime::New,
                self.break_even(|deduction| old_tax_with(deduction) <= new_regime_tax),
            )
        } else {
            (Regime::Old, Some(Decimal::ZERO))
        };

        debug!(
            %gross_income,
            year = fiscal_year_start,
            %new_regime_tax,
            %old_regime_tax,
            %better_regime,
            break_even = ?break_even_deduction,
            "compared regimes"
        );

        Ok(RegimeComparisonResult {
            new_regime_tax,
            old_regime_tax,
            better_regime,
            break_even_deduction,
        })
    }

    fn config(
        &self,
        fiscal_year_start: i32,
        regime: Regime,
        standard_deduction: Option<Decimal>,
    ) -> Result<RegimeConfig, TaxRuleError> {
        let config = self.rules.config(fiscal_year_start, regime)?;
        Ok(match standard_deduction {
            Some(amount) => config.with_standard_deduction(clamp_money(amount)),
            None => config,
        })
    }

    /// Smallest grid deduction satisfying `reaches_parity`, or `None` if even
    /// the cap does not.
    fn break_even(
        &self,
        reaches_parity: impl Fn(Decimal) -> bool,
    ) -> Option<Decimal> {
        let deduction_at = |index: u64| self.options.step * Decimal::from(index);

        let mut high = self.options.step_count();
        if !reaches_parity(deduction_at(high)) {
            return None;
        }
        let mut low = 0;
        while low < high {
            let mid = low + (high - low) / 2;
            if reaches_parity(deduction_at(mid)) {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        Some(deduction_at(low))
    }
}

/// Compares regimes using the default search grid.
pub fn compare_regimes<P: RuleProvider>(
    rules: &P,
    gross_income: Decimal,
    fiscal_year_start: i32,
    standard_deduction: Option<Decimal>,
    salary_months_count: u32,
) -> Result<RegimeComparisonResult, TaxRuleError> {
    RegimeComparator::new(rules, ComparatorOptions::default()).compare(
        gross_income,
        fiscal_year_start,
        standard_deduction,
        salary_months_count,
    )
}
