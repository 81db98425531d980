use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A contiguous income range taxed at a single marginal rate.
///
/// `rate` is a percentage in `[0, 100]`. An `upper` of `None` marks the
/// unbounded top slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxSlab {
    pub fn new(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { lower, upper, rate }
    }

    /// Portion of `taxable_income` falling inside this slab.
    pub fn portion_of(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= self.lower {
            return Decimal::ZERO;
        }
        let top = match self.upper {
            Some(upper) => taxable_income.min(upper),
            None => taxable_income,
        };
        top - self.lower
    }
}

/// Additional percentage of base tax levied on gross income above `threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeTier {
    pub threshold: Decimal,
    pub rate: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn portion_is_zero_at_or_below_lower_bound() {
        let slab = TaxSlab::new(dec!(300000), Some(dec!(700000)), dec!(5));

        assert_eq!(slab.portion_of(dec!(300000)), dec!(0));
        assert_eq!(slab.portion_of(dec!(1000)), dec!(0));
    }

    #[test]
    fn portion_is_capped_at_upper_bound() {
        let slab = TaxSlab::new(dec!(300000), Some(dec!(700000)), dec!(5));

        assert_eq!(slab.portion_of(dec!(725000)), dec!(400000));
        assert_eq!(slab.portion_of(dec!(450000)), dec!(150000));
    }

    #[test]
    fn unbounded_slab_takes_everything_above_lower() {
        let slab = TaxSlab::new(dec!(2400000), None, dec!(30));

        assert_eq!(slab.portion_of(dec!(5000000)), dec!(2600000));
    }
}
