//! Engine settings, loaded from TOML.
//!
//! ```toml
//! fiscal_year_start_month = 4
//! default_regime = "new"
//!
//! [solver]
//! max_iterations = 10
//! tolerance = 1
//!
//! [comparator]
//! step = 10000
//! cap = 1000000
//! ```
//!
//! Every key is optional and falls back to the value shown.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::{ComparatorOptions, SolverOptions};
use crate::models::Regime;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("fiscal year start month must be between 1 and 12, got {0}")]
    InvalidStartMonth(u32),

    #[error("solver needs at least one iteration")]
    NoIterations,

    #[error("solver tolerance must be positive, got {0}")]
    InvalidTolerance(Decimal),

    #[error("comparator step must be positive, got {0}")]
    InvalidStep(Decimal),

    #[error("comparator cap {cap} is smaller than its step {step}")]
    CapBelowStep { cap: Decimal, step: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub fiscal_year_start_month: u32,
    pub default_regime: Regime,
    pub solver: SolverOptions,
    pub comparator: ComparatorOptions,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fiscal_year_start_month: 4,
            default_regime: Regime::New,
            solver: SolverOptions::default(),
            comparator: ComparatorOptions::default(),
        }
    }
}

impl EngineSettings {
    /// Parses and validates settings from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a TOML settings file.
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let source = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=12).contains(&self.fiscal_year_start_month) {
            return Err(SettingsError::InvalidStartMonth(self.fiscal_year_start_month));
        }
        if self.solver.max_iterations == 0 {
            return Err(SettingsError::NoIterations);
        }
        if self.solver.tolerance <= Decimal::ZERO {
            return Err(SettingsError::InvalidTolerance(self.solver.tolerance));
        }
        if self.comparator.step <= Decimal::ZERO {
            return Err(SettingsError::InvalidStep(self.comparator.step));
        }
        if self.comparator.cap < self.comparator.step {
            return Err(SettingsError::CapBelowStep {
                cap: self.comparator.cap,
                step: self.comparator.step,
            });
        }
        Ok(())
    }

    /// The regime to use: an explicit choice wins over the stored default.
    pub fn regime_or_default(
        &self,
        choice: Option<Regime>,
    ) -> Regime {
        choice.unwrap_or(self.default_regime)
    }
}
