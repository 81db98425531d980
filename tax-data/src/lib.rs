//! Rule-table loading and tooling around `tax-core`.

pub mod loader;
pub mod logging;

pub use loader::{RuleTableLoader, RuleTableLoaderError, SlabRecord};
