//! Tax rule tables keyed by fiscal year and regime.
//!
//! Rules are data: each [`RegimeConfig`] stays in effect from its
//! `fiscal_year_start` until a later table for the same regime replaces it,
//! so adding a year's rules never touches calculator code.

mod registry;
mod tables;

use thiserror::Error;

use crate::models::{Regime, RegimeConfig};

pub use registry::TaxRuleRegistry;

/// Errors returned when looking up rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxRuleError {
    /// The year predates every known rule table.
    #[error("no tax rules are known for fiscal year {0}")]
    UnsupportedFiscalYear(i32),

    /// Rules exist for the year, but not for this regime.
    #[error("the {regime} regime is not available in fiscal year {year}")]
    RegimeUnavailable { regime: Regime, year: i32 },
}

/// Source of the rule set that applies to a fiscal year and regime.
pub trait RuleProvider: Send + Sync {
    /// Returns the rules for the fiscal year starting in `fiscal_year_start`.
    fn config(
        &self,
        fiscal_year_start: i32,
        regime: Regime,
    ) -> Result<RegimeConfig, TaxRuleError>;

    /// Whether `regime` can be offered for the given year.
    fn is_available(
        &self,
        fiscal_year_start: i32,
        regime: Regime,
    ) -> bool {
        self.config(fiscal_year_start, regime).is_ok()
    }
}
