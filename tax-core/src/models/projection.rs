use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TaxBreakdown;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub gross_taxable_income: Decimal,
    pub breakdown: TaxBreakdown,
    pub remaining_months: u32,
    pub avg_monthly_recurring_income: Decimal,
    pub projected_additional_income: Decimal,
    pub projected_net_total: Decimal,
    pub projected_salary_months: u32,
    /// False when the gross income could not be recovered within the
    /// solver's iteration budget.
    pub converged: bool,
}
