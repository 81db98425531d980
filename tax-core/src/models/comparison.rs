use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Regime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeComparisonResult {
    pub new_regime_tax: Decimal,
    pub old_regime_tax: Decimal,
    pub better_regime: Regime,
    /// Extra old-regime deductions needed to match the new regime.
    /// `Some(0)` when the old regime already wins, `None` when no deduction
    /// up to the search cap gets there.
    pub break_even_deduction: Option<Decimal>,
}

impl RegimeComparisonResult {
    /// Absolute difference between the two regimes' liabilities.
    pub fn savings(&self) -> Decimal {
        (self.old_regime_tax - self.new_regime_tax).abs()
    }
}
