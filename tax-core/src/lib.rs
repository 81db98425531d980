pub mod calculations;
pub mod engine;
pub mod models;
pub mod rules;
pub mod settings;

pub use engine::TaxEngine;
pub use models::*;
pub use rules::{RuleProvider, TaxRuleError, TaxRuleRegistry};
pub use settings::{EngineSettings, SettingsError};
