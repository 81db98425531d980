mod comparison;
mod fiscal_year;
mod income_aggregate;
mod projection;
mod regime;
mod regime_config;
mod tax_breakdown;
mod tax_slab;

pub use comparison::RegimeComparisonResult;
pub use fiscal_year::{FiscalYear, FiscalYearError};
pub use income_aggregate::IncomeAggregate;
pub use projection::ProjectionResult;
pub use regime::Regime;
pub use regime_config::{RegimeConfig, RegimeConfigError};
pub use tax_breakdown::{SlabLine, TaxBreakdown};
pub use tax_slab::{SurchargeTier, TaxSlab};
