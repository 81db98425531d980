//! Forward progressive tax calculation.
//!
//! Given gross income and a [`RegimeConfig`], produces an itemised
//! [`TaxBreakdown`]:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Taxable income: gross - standard deduction (minimum 0) |
//! | 2    | Base tax: sum over slabs of income in slab × slab rate |
//! | 3    | Rebate: whole base tax (up to the cap) at or below the rebate threshold |
//! | 4    | Surcharge: tier rate × base tax for gross above a tier threshold |
//! | 5    | Cess: cess rate × (base tax - rebate + surcharge) |
//! | 6    | Professional tax: monthly levy × salaried months (capped) |
//! | 7    | Total: steps 2 - 3 + 4 + 5 + 6 (minimum 0) |
//!
//! # Rebate cliff
//!
//! The rebate is all-or-nothing at the threshold. When the table enables
//! `rebate_marginal_relief`, tax before cess just above the threshold is
//! capped at the income in excess of the threshold, which removes the
//! cliff. Without it, one rupee past the threshold raises the tax by the
//! whole rebate.
//!
//! # Surcharge relief
//!
//! The surcharge is capped so that tax plus surcharge exceeds the liability
//! at the tier threshold by no more than the income above that threshold.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::ProgressiveTaxCalculator;
//! use tax_core::{Regime, TaxRuleRegistry};
//!
//! let registry = TaxRuleRegistry::builtin();
//! let config = registry.get_config(2024, Regime::New).unwrap();
//!
//! let breakdown = ProgressiveTaxCalculator::new(&config).calculate(dec!(800000), true, 12);
//!
//! assert_eq!(breakdown.taxable_income, dec!(725000));
//! assert_eq!(breakdown.base_tax, dec!(22500.00));
//! assert_eq!(breakdown.cess, dec!(900.00));
//! assert_eq!(breakdown.professional_tax, dec!(2400));
//! assert_eq!(breakdown.total_tax, dec!(25800.00));
//! ```

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::{clamp_money, max, percent_of};
use crate::models::{RegimeConfig, SlabLine, TaxBreakdown};

/// Calculator for the forward tax function of a single rule set.
///
/// Holds only a borrowed config, so it is cheap to build per call and safe
/// to share between threads.
#[derive(Debug, Clone, Copy)]
pub struct ProgressiveTaxCalculator<'a> {
    config: &'a RegimeConfig,
}

impl<'a> ProgressiveTaxCalculator<'a> {
    pub fn new(config: &'a RegimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a RegimeConfig {
        self.config
    }

    /// Calculates the full tax breakdown for `gross_income`.
    ///
    /// Negative income is treated as zero. Professional tax is only levied
    /// when `apply_professional_tax` is set, for at most the table's month
    /// cap.
    pub fn calculate(
        &self,
        gross_income: Decimal,
        apply_professional_tax: bool,
        salary_months_count: u32,
    ) -> TaxBreakdown {
        if gross_income < Decimal::ZERO {
            warn!(%gross_income, "negative gross income clamped to zero");
        }
        let gross_income = clamp_money(gross_income);

        let taxable_income = self.taxable_income(gross_income);
        let (base_tax, slab_lines) = self.slab_tax(taxable_income);
        let (rebate_87a, marginal_relief_applied) = self.rebate(taxable_income, base_tax);
        let surcharge = self.surcharge(gross_income, base_tax - rebate_87a);
        let cess = self.cess(base_tax - rebate_87a + surcharge);
        let professional_tax = self.professional_tax(apply_professional_tax, salary_months_count);

        let total_tax = max(
            base_tax - rebate_87a + surcharge + cess + professional_tax,
            Decimal::ZERO,
        );

        TaxBreakdown {
            gross_income,
            taxable_income,
            base_tax,
            slab_lines,
            rebate_87a,
            marginal_relief_applied,
            surcharge,
            cess,
            professional_tax,
            total_tax,
        }
    }

    /// Breakdowns for each income in a sweep, e.g. to chart effective rates.
    pub fn tax_curve(
        &self,
        incomes: impl IntoIterator<Item = Decimal>,
        apply_professional_tax: bool,
        salary_months_count: u32,
    ) -> Vec<TaxBreakdown> {
        incomes
            .into_iter()
            .map(|income| self.calculate(income, apply_professional_tax, salary_months_count))
            .collect()
    }

    fn taxable_income(
        &self,
        gross_income: Decimal,
    ) -> Decimal {
        clamp_money(gross_income - self.config.standard_deduction)
    }

    /// Base tax over the slab table, with one line per slab that received
    /// income.
    fn slab_tax(
        &self,
        taxable_income: Decimal,
    ) -> (Decimal, Vec<SlabLine>) {
        let slab_lines: Vec<SlabLine> = self
            .config
            .slabs
            .iter()
            .filter(|slab| taxable_income > slab.lower)
            .map(|slab| {
                let taxable_in_slab = slab.portion_of(taxable_income);
                SlabLine {
                    slab: slab.clone(),
                    taxable_in_slab,
                    tax_amount: percent_of(taxable_in_slab, slab.rate),
                }
            })
            .collect();

        let base_tax = slab_lines.iter().map(|line| line.tax_amount).sum();
        (base_tax, slab_lines)
    }

    /// Rebate granted against base tax, and whether it came from marginal
    /// relief rather than the full rebate.
    fn rebate(
        &self,
        taxable_income: Decimal,
        base_tax: Decimal,
    ) -> (Decimal, bool) {
        if taxable_income <= self.config.rebate_threshold {
            return (base_tax.min(self.config.rebate_cap), false);
        }

        if self.config.rebate_marginal_relief {
            let excess = taxable_income - self.config.rebate_threshold;
            if base_tax > excess {
                return (base_tax - excess, true);
            }
        }

        (Decimal::ZERO, false)
    }

    fn surcharge(
        &self,
        gross_income: Decimal,
        tax_after_rebate: Decimal,
    ) -> Decimal {
        let tiers = &self.config.surcharge_tiers;
        let Some(index) = tiers.iter().rposition(|tier| gross_income > tier.threshold) else {
            return Decimal::ZERO;
        };
        let tier = &tiers[index];
        let full = percent_of(tax_after_rebate, tier.rate);

        // Liability at the threshold itself carries the previous tier's rate.
        let previous_rate = index
            .checked_sub(1)
            .map_or(Decimal::ZERO, |previous| tiers[previous].rate);
        let (tax_at_threshold, _) = self.slab_tax(self.taxable_income(tier.threshold));
        let liability_at_threshold = tax_at_threshold + percent_of(tax_at_threshold, previous_rate);
        let ceiling = liability_at_threshold + (gross_income - tier.threshold) - tax_after_rebate;

        clamp_money(full.min(ceiling))
    }

    fn cess(
        &self,
        tax_before_cess: Decimal,
    ) -> Decimal {
        percent_of(clamp_money(tax_before_cess), self.config.cess_rate)
    }

    fn professional_tax(
        &self,
        apply: bool,
        salary_months_count: u32,
    ) -> Decimal {
        if !apply {
            return Decimal::ZERO;
        }
        let months = salary_months_count.min(self.config.professional_tax_month_cap);
        self.config.professional_tax_per_month * Decimal::from(months)
    }
}

/// Forward tax calculation for a single income under `config`.
pub fn calculate_tax(
    gross_income: Decimal,
    config: &RegimeConfig,
    apply_professional_tax: bool,
    salary_months_count: u32,
) -> TaxBreakdown {
    ProgressiveTaxCalculator::new(config).calculate(
        gross_income,
        apply_professional_tax,
        salary_months_count,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::Regime;
    use crate::rules::TaxRuleRegistry;

    fn config(
        year: i32,
        regime: Regime,
    ) -> RegimeConfig {
        TaxRuleRegistry::builtin().get_config(year, regime).unwrap()
    }

    // =========================================================================
    // taxable income and slab tests
    // =========================================================================

    #[test]
    fn zero_income_has_zero_tax() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(0), &config, false, 0);

        assert_eq!(breakdown.total_tax, dec!(0));
        assert!(breakdown.slab_lines.is_empty());
    }

    #[test]
    fn taxable_income_is_zero_below_standard_deduction() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(60000), &config, false, 0);

        assert_eq!(breakdown.taxable_income, dec!(0));
        assert_eq!(breakdown.base_tax, dec!(0));
    }

    #[test]
    fn negative_income_is_clamped() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(-50000), &config, false, 0);

        assert_eq!(breakdown.gross_income, dec!(0));
        assert_eq!(breakdown.total_tax, dec!(0));
    }

    #[test]
    fn pre_2025_table_worked_example() {
        // FY 2024-25 six-bracket table, standard deduction 75,000.
        let config = config(2024, Regime::New);

        let breakdown = calculate_tax(dec!(800000), &config, true, 12);

        assert_eq!(breakdown.taxable_income, dec!(725000));
        assert_eq!(breakdown.base_tax, dec!(22500.00));
        assert_eq!(breakdown.rebate_87a, dec!(0));
        assert_eq!(breakdown.cess, dec!(900.00));
        assert_eq!(breakdown.professional_tax, dec!(2400));
        assert_eq!(breakdown.total_tax, dec!(25800.00));
    }

    #[test]
    fn slab_lines_cover_only_slabs_with_income() {
        let config = config(2024, Regime::New);

        let breakdown = calculate_tax(dec!(800000), &config, false, 0);
        let amounts: Vec<(Decimal, Decimal)> = breakdown
            .slab_lines
            .iter()
            .map(|line| (line.taxable_in_slab, line.tax_amount))
            .collect();

        assert_eq!(
            amounts,
            vec![
                (dec!(300000), dec!(0)),
                (dec!(400000), dec!(20000)),
                (dec!(25000), dec!(2500)),
            ]
        );
    }

    #[test]
    fn seven_bracket_table_worked_example() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(1000000), &config, false, 0);

        assert_eq!(breakdown.taxable_income, dec!(925000));
        assert_eq!(breakdown.base_tax, dec!(32500.00));
        // Fully rebated: taxable income is under the 12L threshold.
        assert_eq!(breakdown.rebate_87a, dec!(32500.00));
        assert_eq!(breakdown.total_tax, dec!(0));
    }

    // =========================================================================
    // rebate tests
    // =========================================================================

    #[test]
    fn old_regime_rebate_cliff_jumps_past_threshold() {
        let config = config(2024, Regime::Old);

        let at_threshold = calculate_tax(dec!(550000), &config, false, 0);
        let past_threshold = calculate_tax(dec!(550001), &config, false, 0);

        assert_eq!(at_threshold.taxable_income, dec!(500000));
        assert_eq!(at_threshold.rebate_87a, dec!(12500.00));
        assert_eq!(at_threshold.total_tax, dec!(0));

        assert_eq!(past_threshold.rebate_87a, dec!(0));
        assert!(!past_threshold.marginal_relief_applied);
        assert_eq!(past_threshold.base_tax, dec!(12500.20));
        assert_eq!(past_threshold.total_tax, dec!(13000.21));
    }

    #[test]
    fn rebate_is_limited_by_cap() {
        let mut config = config(2024, Regime::Old);
        config.rebate_cap = dec!(5000);

        let breakdown = calculate_tax(dec!(550000), &config, false, 0);

        assert_eq!(breakdown.rebate_87a, dec!(5000));
        assert_eq!(breakdown.total_tax, dec!(7800.00));
    }

    #[test]
    fn marginal_relief_caps_tax_at_excess_over_threshold() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(1285000), &config, false, 0);

        assert_eq!(breakdown.taxable_income, dec!(1210000));
        assert_eq!(breakdown.base_tax, dec!(61500.00));
        assert!(breakdown.marginal_relief_applied);
        assert_eq!(breakdown.rebate_87a, dec!(51500.00));
        assert_eq!(breakdown.cess, dec!(400.00));
        assert_eq!(breakdown.total_tax, dec!(10400.00));
    }

    #[test]
    fn marginal_relief_stops_once_slab_tax_is_below_excess() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(1355000), &config, false, 0);

        assert_eq!(breakdown.taxable_income, dec!(1280000));
        assert!(!breakdown.marginal_relief_applied);
        assert_eq!(breakdown.rebate_87a, dec!(0));
        assert_eq!(breakdown.total_tax, dec!(74880.00));
    }

    #[test]
    fn marginal_relief_removes_cliff() {
        let config = config(2025, Regime::New);

        let at_threshold = calculate_tax(dec!(1275000), &config, false, 0);
        let past_threshold = calculate_tax(dec!(1275001), &config, false, 0);

        assert_eq!(at_threshold.total_tax, dec!(0));
        assert_eq!(past_threshold.total_tax, dec!(1.04));
    }

    // =========================================================================
    // surcharge tests
    // =========================================================================

    #[test]
    fn no_surcharge_at_threshold() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(5000000), &config, false, 0);

        assert_eq!(breakdown.surcharge, dec!(0));
    }

    #[test]
    fn full_surcharge_well_above_threshold() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(6000000), &config, false, 0);

        assert_eq!(breakdown.base_tax, dec!(1357500.00));
        assert_eq!(breakdown.surcharge, dec!(135750.00));
        assert_eq!(breakdown.cess, dec!(59730.00));
        assert_eq!(breakdown.total_tax, dec!(1552980.00));
    }

    #[test]
    fn surcharge_relief_just_above_threshold() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(5010000), &config, false, 0);

        assert_eq!(breakdown.base_tax, dec!(1060500.00));
        // Full surcharge would be 106,050; relief limits it to the 10,000
        // earned above the threshold less the extra slab tax.
        assert_eq!(breakdown.surcharge, dec!(7000.00));
    }

    // =========================================================================
    // professional tax tests
    // =========================================================================

    #[test]
    fn professional_tax_skipped_without_employment() {
        let config = config(2024, Regime::New);

        let breakdown = calculate_tax(dec!(800000), &config, false, 12);

        assert_eq!(breakdown.professional_tax, dec!(0));
        assert_eq!(breakdown.total_tax, dec!(23400.00));
    }

    #[test]
    fn professional_tax_capped_at_month_limit() {
        let config = config(2024, Regime::New);

        let breakdown = calculate_tax(dec!(800000), &config, true, 15);

        assert_eq!(breakdown.professional_tax, dec!(2400));
    }

    #[test]
    fn professional_tax_alone_when_income_is_rebated() {
        let config = config(2025, Regime::New);

        let breakdown = calculate_tax(dec!(1000000), &config, true, 3);

        assert_eq!(breakdown.total_tax, dec!(600));
    }

    // =========================================================================
    // breakdown helper tests
    // =========================================================================

    #[test]
    fn effective_rate_is_percentage_of_gross() {
        let config = config(2024, Regime::New);

        let breakdown = calculate_tax(dec!(1075000), &config, false, 0);

        assert_eq!(breakdown.total_tax, dec!(52000.00));
        assert_eq!(breakdown.effective_rate(), dec!(4.84));
        assert_eq!(breakdown.net_income(), dec!(1023000.00));
    }

    #[test]
    fn effective_rate_of_zero_income_is_zero() {
        let config = config(2024, Regime::New);

        assert_eq!(calculate_tax(dec!(0), &config, false, 0).effective_rate(), dec!(0));
    }

    #[test]
    fn tax_curve_returns_one_breakdown_per_income() {
        let config = config(2025, Regime::New);
        let calculator = ProgressiveTaxCalculator::new(&config);

        let curve = calculator.tax_curve(
            (0..=20).map(|step| Decimal::from(step * 250_000)),
            false,
            0,
        );

        assert_eq!(curve.len(), 21);
        assert!(curve.windows(2).all(|pair| pair[0].total_tax <= pair[1].total_tax));
    }
}
