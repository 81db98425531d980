use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TaxSlab;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabLine {
    pub slab: TaxSlab,
    pub taxable_in_slab: Decimal,
    pub tax_amount: Decimal,
}

/// Itemised result of a forward tax calculation.
///
/// `slab_lines` only lists slabs that received part of the taxable income.
/// `rebate_87a` includes any marginal relief granted just above the rebate
/// threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub gross_income: Decimal,
    pub taxable_income: Decimal,
    pub base_tax: Decimal,
    pub slab_lines: Vec<SlabLine>,
    pub rebate_87a: Decimal,
    pub marginal_relief_applied: bool,
    pub surcharge: Decimal,
    pub cess: Decimal,
    pub professional_tax: Decimal,
    pub total_tax: Decimal,
}

impl TaxBreakdown {
    /// Total tax as a percentage of gross income.
    pub fn effective_rate(&self) -> Decimal {
        if self.gross_income <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.total_tax * Decimal::ONE_HUNDRED / self.gross_income).round_dp(2)
    }

    /// Income left after tax.
    pub fn net_income(&self) -> Decimal {
        self.gross_income - self.total_tax
    }
}
