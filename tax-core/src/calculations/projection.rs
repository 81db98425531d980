//! Year-end projection from partial-year actuals.
//!
//! Recurring income seen recently (typically salary credits) is assumed to
//! keep arriving for the rest of the fiscal year. The projected net total is
//! grossed up with [`ReverseGrossIncomeSolver`] and taxed with
//! [`ProgressiveTaxCalculator`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{clamp_money, round_half_up};
use crate::calculations::{ProgressiveTaxCalculator, ReverseGrossIncomeSolver, SolverOptions};
use crate::models::{FiscalYear, IncomeAggregate, ProjectionResult, RegimeConfig};

/// How many of the most recent recurring credits feed the monthly average.
pub const RECENT_RECURRING_WINDOW: usize = 3;

/// Months of the fiscal year still to come, counting `current_month` as not
/// yet received.
///
/// Months are 1-based; values outside `1..=12` wrap around.
pub fn remaining_months(
    current_month: u32,
    fiscal_year_start_month: u32,
) -> u32 {
    let elapsed = (i64::from(current_month) - i64::from(fiscal_year_start_month)).rem_euclid(12);
    (12 - elapsed) as u32
}

/// Mean of up to [`RECENT_RECURRING_WINDOW`] leading amounts.
fn recent_average(amounts: &[Decimal]) -> Decimal {
    let recent = &amounts[..amounts.len().min(RECENT_RECURRING_WINDOW)];
    if recent.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = recent.iter().copied().map(clamp_money).sum();
    round_half_up(total / Decimal::from(recent.len()))
}

#[derive(Debug, Clone)]
pub struct YearEndProjectionEstimator<'a> {
    config: &'a RegimeConfig,
    solver_options: SolverOptions,
}

impl<'a> YearEndProjectionEstimator<'a> {
    pub fn new(
        config: &'a RegimeConfig,
        solver_options: SolverOptions,
    ) -> Self {
        Self {
            config,
            solver_options,
        }
    }

    /// Projects the aggregate to the end of the fiscal year, given the
    /// current calendar month and the month the fiscal year starts in.
    pub fn project(
        &self,
        aggregate: &IncomeAggregate,
        current_month: u32,
        fiscal_year_start_month: u32,
    ) -> ProjectionResult {
        self.project_remaining(
            aggregate,
            remaining_months(current_month, fiscal_year_start_month),
        )
    }

    /// Projects using dates; a fiscal year that has already ended has no
    /// remaining months and yields the actual figures.
    pub fn project_as_of(
        &self,
        aggregate: &IncomeAggregate,
        fiscal_year: &FiscalYear,
        today: NaiveDate,
    ) -> ProjectionResult {
        self.project_remaining(aggregate, fiscal_year.remaining_months_as_of(today))
    }

    /// Projects with an explicit number of months still to come.
    pub fn project_remaining(
        &self,
        aggregate: &IncomeAggregate,
        remaining_months: u32,
    ) -> ProjectionResult {
        let avg_monthly_recurring_income = recent_average(&aggregate.recent_recurring_amounts);
        let net_received = clamp_money(aggregate.net_received_taxable);

        let (projected_additional_income, projected_salary_months) =
            if aggregate.recent_recurring_amounts.is_empty() || remaining_months == 0 {
                (Decimal::ZERO, aggregate.salary_months_count)
            } else {
                (
                    round_half_up(avg_monthly_recurring_income * Decimal::from(remaining_months)),
                    aggregate.salary_months_count + remaining_months,
                )
            };
        let projected_net_total = net_received + projected_additional_income;

        // Professional tax follows employment income already on record.
        let apply_professional_tax = aggregate.salary_months_count > 0;

        let solution = ReverseGrossIncomeSolver::new(self.config, self.solver_options.clone())
            .solve(projected_net_total, apply_professional_tax, projected_salary_months);
        let breakdown = ProgressiveTaxCalculator::new(self.config).calculate(
            solution.gross_income,
            apply_professional_tax,
            projected_salary_months,
        );

        debug!(
            remaining_months,
            %avg_monthly_recurring_income,
            %projected_net_total,
            gross = %solution.gross_income,
            converged = solution.converged,
            "year-end projection"
        );

        ProjectionResult {
            gross_taxable_income: solution.gross_income,
            breakdown,
            remaining_months,
            avg_monthly_recurring_income,
            projected_additional_income,
            projected_net_total,
            projected_salary_months,
            converged: solution.converged,
        }
    }
}
