use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{Regime, RegimeConfig, RegimeConfigError, TaxRuleRegistry};
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading slab tables.
#[derive(Debug, Error)]
pub enum RuleTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid regime '{0}' (expected 'old' or 'new')")]
    InvalidRegime(String),

    #[error("No {regime} regime table exists on or before fiscal year {year} to extend")]
    NoBaseTable { regime: Regime, year: i32 },

    #[error("Invalid {regime} regime table for fiscal year {year}: {source}")]
    InvalidTable {
        regime: Regime,
        year: i32,
        #[source]
        source: RegimeConfigError,
    },
}

impl From<csv::Error> for RuleTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RuleTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single slab row from a rule-table CSV file.
///
/// - `fiscal_year`: calendar year the fiscal year starts in (e.g. 2026 for FY 2026-27)
/// - `regime`: `old` or `new`
/// - `lower`: lower bound of the slab
/// - `upper`: upper bound of the slab (empty for the top slab)
/// - `rate`: marginal rate in percent (e.g. 5 for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SlabRecord {
    pub fiscal_year: i32,
    pub regime: String,
    pub lower: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for slab tables from CSV files.
///
/// Each `(fiscal_year, regime)` group in the file replaces the slabs of the
/// table in effect for that year. Every other rule (deductions, rebate,
/// surcharge, cess) carries over from that table, so publishing a new
/// year's slabs needs nothing but rows in the file.
pub struct RuleTableLoader;

impl RuleTableLoader {
    /// Parse slab records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<SlabRecord>, RuleTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: SlabRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Apply slab records to `registry`, returning the number of tables
    /// written.
    ///
    /// Groups are applied in ascending fiscal year, so a file may extend a
    /// table it introduced itself. A group that fails validation stops the
    /// load; groups before it stay applied.
    pub fn apply(
        registry: &mut TaxRuleRegistry,
        records: &[SlabRecord],
    ) -> Result<usize, RuleTableLoaderError> {
        let mut groups: BTreeMap<(i32, Regime), Vec<&SlabRecord>> = BTreeMap::new();
        for record in records {
            let regime = Regime::parse(&record.regime)
                .ok_or_else(|| RuleTableLoaderError::InvalidRegime(record.regime.clone()))?;
            groups
                .entry((record.fiscal_year, regime))
                .or_default()
                .push(record);
        }

        let mut written = 0;
        for ((year, regime), mut group) in groups {
            group.sort_by(|a, b| a.lower.cmp(&b.lower));

            let base = registry
                .effective_table(year, regime)
                .ok_or(RuleTableLoaderError::NoBaseTable { regime, year })?;
            let table = RegimeConfig {
                fiscal_year_start: year,
                slabs: group
                    .iter()
                    .map(|record| tax_core::TaxSlab::new(record.lower, record.upper, record.rate))
                    .collect(),
                ..base.clone()
            };

            let replaced = registry
                .insert(table)
                .map_err(|source| RuleTableLoaderError::InvalidTable {
                    regime,
                    year,
                    source,
                })?;
            info!(
                %regime,
                year,
                slabs = group.len(),
                replaced = replaced.is_some(),
                "applied slab table"
            );
            written += 1;
        }

        Ok(written)
    }
}
