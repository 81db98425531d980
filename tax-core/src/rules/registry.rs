use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{Regime, RegimeConfig, RegimeConfigError};
use crate::rules::tables::builtin_tables;
use crate::rules::{RuleProvider, TaxRuleError};

/// In-memory rule tables, keyed by regime and the fiscal year each table
/// takes effect.
///
/// A lookup for year `Y` returns the latest table for the regime whose
/// start year is not after `Y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxRuleRegistry {
    tables: BTreeMap<(Regime, i32), RegimeConfig>,
}

impl Default for TaxRuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TaxRuleRegistry {
    /// Registry holding the tables shipped with the engine.
    pub fn builtin() -> Self {
        let tables = builtin_tables()
            .into_iter()
            .map(|config| ((config.regime, config.fiscal_year_start), config))
            .collect();
        Self { tables }
    }

    /// Registry holding only the given tables.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegimeConfigError`] found while validating.
    pub fn from_tables(
        tables: impl IntoIterator<Item = RegimeConfig>
    ) -> Result<Self, RegimeConfigError> {
        let mut registry = Self {
            tables: BTreeMap::new(),
        };
        for table in tables {
            registry.insert(table)?;
        }
        Ok(registry)
    }

    /// Adds or replaces the table taking effect in `config.fiscal_year_start`.
    ///
    /// Returns the table previously stored under the same key.
    pub fn insert(
        &mut self,
        config: RegimeConfig,
    ) -> Result<Option<RegimeConfig>, RegimeConfigError> {
        config.validate()?;
        debug!(
            regime = %config.regime,
            year = config.fiscal_year_start,
            slabs = config.slabs.len(),
            "registering rule table"
        );
        Ok(self
            .tables
            .insert((config.regime, config.fiscal_year_start), config))
    }

    /// The stored table in effect for `fiscal_year_start`, without copying.
    pub fn effective_table(
        &self,
        fiscal_year_start: i32,
        regime: Regime,
    ) -> Option<&RegimeConfig> {
        self.tables
            .range((regime, i32::MIN)..=(regime, fiscal_year_start))
            .next_back()
            .map(|(_, config)| config)
    }

    /// First fiscal year with a table for `regime`.
    pub fn earliest_year(
        &self,
        regime: Regime,
    ) -> Option<i32> {
        self.tables
            .keys()
            .filter(|(r, _)| *r == regime)
            .map(|&(_, year)| year)
            .next()
    }

    /// Returns the rules for the fiscal year starting in `fiscal_year_start`.
    ///
    /// The returned config carries the requested year in `fiscal_year_start`
    /// even when the table itself took effect earlier.
    ///
    /// # Errors
    ///
    /// - [`TaxRuleError::UnsupportedFiscalYear`] if no regime has a table
    ///   for the year.
    /// - [`TaxRuleError::RegimeUnavailable`] if other regimes have tables for
    ///   the year but `regime` does not (the new regime before its
    ///   introduction).
    pub fn get_config(
        &self,
        fiscal_year_start: i32,
        regime: Regime,
    ) -> Result<RegimeConfig, TaxRuleError> {
        match self.effective_table(fiscal_year_start, regime) {
            Some(table) => {
                debug!(
                    %regime,
                    year = fiscal_year_start,
                    table_year = table.fiscal_year_start,
                    "resolved rule table"
                );
                Ok(RegimeConfig {
                    fiscal_year_start,
                    ..table.clone()
                })
            }
            None if self.has_any_table(fiscal_year_start) => Err(TaxRuleError::RegimeUnavailable {
                regime,
                year: fiscal_year_start,
            }),
            None => Err(TaxRuleError::UnsupportedFiscalYear(fiscal_year_start)),
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &RegimeConfig> {
        self.tables.values()
    }

    fn has_any_table(
        &self,
        fiscal_year_start: i32,
    ) -> bool {
        self.tables.keys().any(|&(_, year)| year <= fiscal_year_start)
    }
}

impl RuleProvider for TaxRuleRegistry {
    fn config(
        &self,
        fiscal_year_start: i32,
        regime: Regime,
    ) -> Result<RegimeConfig, TaxRuleError> {
        self.get_config(fiscal_year_start, regime)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn lookup_before_first_table_is_unsupported() {
        let registry = TaxRuleRegistry::builtin();

        assert_eq!(
            registry.get_config(2017, Regime::Old),
            Err(TaxRuleError::UnsupportedFiscalYear(2017))
        );
        assert_eq!(
            registry.get_config(2017, Regime::New),
            Err(TaxRuleError::UnsupportedFiscalYear(2017))
        );
    }

    #[test]
    fn new_regime_unavailable_before_introduction() {
        let registry = TaxRuleRegistry::builtin();

        assert_eq!(
            registry.get_config(2019, Regime::New),
            Err(TaxRuleError::RegimeUnavailable {
                regime: Regime::New,
                year: 2019,
            })
        );
        assert!(!registry.is_available(2019, Regime::New));
        assert!(registry.is_available(2019, Regime::Old));
        assert!(registry.is_available(2020, Regime::New));
    }

    #[test]
    fn old_regime_exists_for_every_supported_year() {
        let registry = TaxRuleRegistry::builtin();

        for year in 2018..=2030 {
            assert!(registry.is_available(year, Regime::Old), "year {year}");
        }
    }

    #[test]
    fn standard_deduction_steps_up_at_cutoff_year() {
        let registry = TaxRuleRegistry::builtin();
        let deduction = |year| {
            registry
                .get_config(year, Regime::New)
                .map(|c| c.standard_deduction)
        };

        assert_eq!(deduction(2023), Ok(dec!(50000)));
        assert_eq!(deduction(2024), Ok(dec!(75000)));
        assert_eq!(deduction(2026), Ok(dec!(75000)));
    }

    #[test]
    fn later_years_inherit_latest_table() {
        let registry = TaxRuleRegistry::builtin();

        let config = registry.get_config(2028, Regime::New).unwrap();

        assert_eq!(config.fiscal_year_start, 2028);
        assert_eq!(config.slabs.len(), 7);
        assert_eq!(config.rebate_threshold, dec!(1200000));
    }

    #[test]
    fn six_bracket_table_precedes_seven_bracket_table() {
        let registry = TaxRuleRegistry::builtin();

        assert_eq!(registry.get_config(2024, Regime::New).unwrap().slabs.len(), 6);
        assert_eq!(registry.get_config(2025, Regime::New).unwrap().slabs.len(), 7);
    }

    #[test]
    fn earliest_year_per_regime() {
        let registry = TaxRuleRegistry::builtin();

        assert_eq!(registry.earliest_year(Regime::Old), Some(2018));
        assert_eq!(
            registry.earliest_year(Regime::New),
            Some(Regime::NEW_REGIME_INTRODUCED)
        );
    }

    #[test]
    fn insert_rejects_invalid_table() {
        let mut registry = TaxRuleRegistry::builtin();
        let mut config = registry.get_config(2025, Regime::New).unwrap();
        config.slabs.clear();

        assert_eq!(registry.insert(config), Err(RegimeConfigError::NoSlabs));
    }

    #[test]
    fn insert_replaces_existing_table() {
        let mut registry = TaxRuleRegistry::builtin();
        let config = registry
            .get_config(2025, Regime::New)
            .unwrap()
            .with_standard_deduction(dec!(100000));

        let previous = registry.insert(config).unwrap();

        assert_eq!(previous.map(|c| c.standard_deduction), Some(dec!(75000)));
        assert_eq!(
            registry.get_config(2025, Regime::New).unwrap().standard_deduction,
            dec!(100000)
        );
    }

    #[test]
    fn empty_registry_supports_nothing() {
        let registry = TaxRuleRegistry::from_tables(Vec::new()).unwrap();

        assert_eq!(
            registry.get_config(2025, Regime::Old),
            Err(TaxRuleError::UnsupportedFiscalYear(2025))
        );
    }
}
