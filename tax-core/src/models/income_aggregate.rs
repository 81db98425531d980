use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fiscal-year income totals produced by the transaction aggregation step.
///
/// `recent_recurring_amounts` holds recurring income credits ordered most
/// recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeAggregate {
    pub net_received_taxable: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub salary_months_count: u32,
    pub recent_recurring_amounts: Vec<Decimal>,
}
