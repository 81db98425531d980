use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Regime, SurchargeTier, TaxSlab};

/// Errors reported by [`RegimeConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegimeConfigError {
    #[error("rule table has no slabs")]
    NoSlabs,

    #[error("first slab must start at zero, got {0}")]
    FirstSlabNotZero(Decimal),

    #[error("slab {index} starts at {lower} but the previous slab ends at {previous_upper}")]
    SlabGap {
        index: usize,
        lower: Decimal,
        previous_upper: Decimal,
    },

    #[error("slab {0} is unbounded but is not the last slab")]
    UnboundedSlabNotLast(usize),

    #[error("last slab must be unbounded")]
    LastSlabBounded,

    #[error("slab {index} has upper bound {upper} not above lower bound {lower}")]
    EmptySlab {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("rate must be between 0 and 100 percent, got {0}")]
    InvalidRate(Decimal),

    #[error("surcharge thresholds must be strictly ascending, got {0} after {1}")]
    SurchargeOrder(Decimal, Decimal),

    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
}

/// The complete rule set of one regime for one fiscal year.
///
/// Rates (`TaxSlab::rate`, `cess_rate`, `SurchargeTier::rate`) are
/// percentages. `fiscal_year_start` is the calendar year the fiscal year
/// begins in, so FY 2024-25 is `2024`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeConfig {
    pub regime: Regime,
    pub fiscal_year_start: i32,
    pub slabs: Vec<TaxSlab>,
    pub standard_deduction: Decimal,
    pub rebate_threshold: Decimal,
    pub rebate_cap: Decimal,
    pub rebate_marginal_relief: bool,
    pub surcharge_tiers: Vec<SurchargeTier>,
    pub cess_rate: Decimal,
    pub professional_tax_per_month: Decimal,
    pub professional_tax_month_cap: u32,
}

impl RegimeConfig {
    /// Returns a copy with the standard deduction replaced.
    pub fn with_standard_deduction(
        &self,
        standard_deduction: Decimal,
    ) -> Self {
        Self {
            standard_deduction,
            ..self.clone()
        }
    }

    /// Checks the slab table and amounts for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RegimeConfigError`] if the slabs are empty, do not start at
    /// zero, leave gaps or overlap, are not capped by a single unbounded top
    /// slab, or if any rate or amount is out of range.
    pub fn validate(&self) -> Result<(), RegimeConfigError> {
        let first = self.slabs.first().ok_or(RegimeConfigError::NoSlabs)?;
        if first.lower != Decimal::ZERO {
            return Err(RegimeConfigError::FirstSlabNotZero(first.lower));
        }

        let last_index = self.slabs.len() - 1;
        for (index, slab) in self.slabs.iter().enumerate() {
            check_rate(slab.rate)?;
            match slab.upper {
                Some(upper) if upper <= slab.lower => {
                    return Err(RegimeConfigError::EmptySlab {
                        index,
                        lower: slab.lower,
                        upper,
                    });
                }
                Some(_) if index == last_index => return Err(RegimeConfigError::LastSlabBounded),
                None if index != last_index => {
                    return Err(RegimeConfigError::UnboundedSlabNotLast(index));
                }
                _ => {}
            }
            if index > 0 {
                let previous_upper = self.slabs[index - 1].upper.unwrap_or(Decimal::MAX);
                if previous_upper != slab.lower {
                    return Err(RegimeConfigError::SlabGap {
                        index,
                        lower: slab.lower,
                        previous_upper,
                    });
                }
            }
        }

        for pair in self.surcharge_tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(RegimeConfigError::SurchargeOrder(
                    pair[1].threshold,
                    pair[0].threshold,
                ));
            }
        }
        for tier in &self.surcharge_tiers {
            check_rate(tier.rate)?;
        }
        check_rate(self.cess_rate)?;

        for (field, value) in [
            ("standard_deduction", self.standard_deduction),
            ("rebate_threshold", self.rebate_threshold),
            ("rebate_cap", self.rebate_cap),
            ("professional_tax_per_month", self.professional_tax_per_month),
        ] {
            if value < Decimal::ZERO {
                return Err(RegimeConfigError::NegativeAmount { field, value });
            }
        }

        Ok(())
    }
}

fn check_rate(rate: Decimal) -> Result<(), RegimeConfigError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(RegimeConfigError::InvalidRate(rate));
    }
    Ok(())
}
