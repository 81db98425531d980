use rust_decimal::Decimal;

use crate::models::{Regime, RegimeConfig, SurchargeTier, TaxSlab};

const CESS_PERCENT: i64 = 4;
const PROFESSIONAL_TAX_PER_MONTH: i64 = 200;
const PROFESSIONAL_TAX_MONTHS: u32 = 12;

fn amount(rupees: i64) -> Decimal {
    Decimal::from(rupees)
}

/// Builds a slab table from `(upper bound, rate)` pairs, the final pair
/// having no upper bound.
fn slabs(bounds: &[(Option<i64>, i64)]) -> Vec<TaxSlab> {
    let mut lower = Decimal::ZERO;
    bounds
        .iter()
        .map(|&(upper, rate)| {
            let slab = TaxSlab::new(lower, upper.map(amount), amount(rate));
            if let Some(upper) = upper {
                lower = amount(upper);
            }
            slab
        })
        .collect()
}

fn surcharges(tiers: &[(i64, i64)]) -> Vec<SurchargeTier> {
    tiers
        .iter()
        .map(|&(threshold, rate)| SurchargeTier {
            threshold: amount(threshold),
            rate: amount(rate),
        })
        .collect()
}

struct TableSpec<'a> {
    regime: Regime,
    from_year: i32,
    slabs: &'a [(Option<i64>, i64)],
    standard_deduction: i64,
    rebate_threshold: i64,
    rebate_cap: i64,
    rebate_marginal_relief: bool,
    surcharge_tiers: &'a [(i64, i64)],
}

impl TableSpec<'_> {
    fn build(&self) -> RegimeConfig {
        RegimeConfig {
            regime: self.regime,
            fiscal_year_start: self.from_year,
            slabs: slabs(self.slabs),
            standard_deduction: amount(self.standard_deduction),
            rebate_threshold: amount(self.rebate_threshold),
            rebate_cap: amount(self.rebate_cap),
            rebate_marginal_relief: self.rebate_marginal_relief,
            surcharge_tiers: surcharges(self.surcharge_tiers),
            cess_rate: amount(CESS_PERCENT),
            professional_tax_per_month: amount(PROFESSIONAL_TAX_PER_MONTH),
            professional_tax_month_cap: PROFESSIONAL_TAX_MONTHS,
        }
    }
}

const OLD_SLABS: &[(Option<i64>, i64)] = &[
    (Some(250_000), 0),
    (Some(500_000), 5),
    (Some(1_000_000), 20),
    (None, 30),
];

const SURCHARGE_FULL: &[(i64, i64)] = &[
    (5_000_000, 10),
    (10_000_000, 15),
    (20_000_000, 25),
    (50_000_000, 37),
];

const SURCHARGE_CAPPED: &[(i64, i64)] = &[(5_000_000, 10), (10_000_000, 15), (20_000_000, 25)];

// Seven brackets, 2.5L wide.
const NEW_SLABS_2020: &[(Option<i64>, i64)] = &[
    (Some(250_000), 0),
    (Some(500_000), 5),
    (Some(750_000), 10),
    (Some(1_000_000), 15),
    (Some(1_250_000), 20),
    (Some(1_500_000), 25),
    (None, 30),
];

const NEW_SLABS_2023: &[(Option<i64>, i64)] = &[
    (Some(300_000), 0),
    (Some(600_000), 5),
    (Some(900_000), 10),
    (Some(1_200_000), 15),
    (Some(1_500_000), 20),
    (None, 30),
];

const NEW_SLABS_2024: &[(Option<i64>, i64)] = &[
    (Some(300_000), 0),
    (Some(700_000), 5),
    (Some(1_000_000), 10),
    (Some(1_200_000), 15),
    (Some(1_500_000), 20),
    (None, 30),
];

const NEW_SLABS_2025: &[(Option<i64>, i64)] = &[
    (Some(400_000), 0),
    (Some(800_000), 5),
    (Some(1_200_000), 10),
    (Some(1_600_000), 15),
    (Some(2_000_000), 20),
    (Some(2_400_000), 25),
    (None, 30),
];

/// Every rule table shipped with the engine.
pub(crate) fn builtin_tables() -> Vec<RegimeConfig> {
    [
        TableSpec {
            regime: Regime::Old,
            from_year: 2018,
            slabs: OLD_SLABS,
            standard_deduction: 40_000,
            rebate_threshold: 350_000,
            rebate_cap: 2_500,
            rebate_marginal_relief: false,
            surcharge_tiers: SURCHARGE_FULL,
        },
        TableSpec {
            regime: Regime::Old,
            from_year: 2019,
            slabs: OLD_SLABS,
            standard_deduction: 50_000,
            rebate_threshold: 500_000,
            rebate_cap: 12_500,
            rebate_marginal_relief: false,
            surcharge_tiers: SURCHARGE_FULL,
        },
        TableSpec {
            regime: Regime::New,
            from_year: Regime::NEW_REGIME_INTRODUCED,
            slabs: NEW_SLABS_2020,
            standard_deduction: 0,
            rebate_threshold: 500_000,
            rebate_cap: 12_500,
            rebate_marginal_relief: false,
            surcharge_tiers: SURCHARGE_FULL,
        },
        TableSpec {
            regime: Regime::New,
            from_year: 2023,
            slabs: NEW_SLABS_2023,
            standard_deduction: 50_000,
            rebate_threshold: 700_000,
            rebate_cap: 25_000,
            rebate_marginal_relief: true,
            surcharge_tiers: SURCHARGE_CAPPED,
        },
        TableSpec {
            regime: Regime::New,
            from_year: 2024,
            slabs: NEW_SLABS_2024,
            standard_deduction: 75_000,
            rebate_threshold: 700_000,
            rebate_cap: 25_000,
            rebate_marginal_relief: true,
            surcharge_tiers: SURCHARGE_CAPPED,
        },
        TableSpec {
            regime: Regime::New,
            from_year: 2025,
            slabs: NEW_SLABS_2025,
            standard_deduction: 75_000,
            rebate_threshold: 1_200_000,
            rebate_cap: 60_000,
            rebate_marginal_relief: true,
            surcharge_tiers: SURCHARGE_CAPPED,
        },
    ]
    .iter()
    .map(TableSpec::build)
    .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn every_builtin_table_validates() {
        for table in builtin_tables() {
            assert_eq!(
                table.validate(),
                Ok(()),
                "{} regime from {}",
                table.regime,
                table.fiscal_year_start
            );
        }
    }

    #[test]
    fn slab_builder_chains_bounds() {
        let built = slabs(&[(Some(100), 0), (Some(300), 10), (None, 20)]);

        assert_eq!(
            built,
            vec![
                TaxSlab::new(dec!(0), Some(dec!(100)), dec!(0)),
                TaxSlab::new(dec!(100), Some(dec!(300)), dec!(10)),
                TaxSlab::new(dec!(300), None, dec!(20)),
            ]
        );
    }

    #[test]
    fn bracket_counts_match_history() {
        let tables = builtin_tables();
        let count = |regime: Regime, year: i32| {
            tables
                .iter()
                .find(|t| t.regime == regime && t.fiscal_year_start == year)
                .map(|t| t.slabs.len())
        };

        assert_eq!(count(Regime::New, 2024), Some(6));
        assert_eq!(count(Regime::New, 2025), Some(7));
        assert_eq!(count(Regime::Old, 2019), Some(4));
    }
}
