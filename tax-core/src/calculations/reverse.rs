//! Recovery of gross income from the net amount actually received.
//!
//! Transaction records hold what was credited after withholding, so the
//! gross figure is found numerically: starting from the net amount, each
//! step computes the tax on the current guess and adds the shortfall
//! between the implied net and the received net back onto the guess.
//!
//! Away from the rebate cliff the implied net rises with slope in `(0, 1]`,
//! so the shortfall shrinks by roughly the marginal rate (plus cess) every
//! step. At high marginal rates ten steps may not be enough. Near the rebate
//! threshold the forward function misbehaves in one of two ways: without
//! marginal relief the implied net jumps down at the cliff, and with it the
//! tax rises faster than income across the relief band, so the implied net
//! falls and the iteration crawls across the band. The solution therefore
//! reports whether it converged instead of passing off a best guess as
//! exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::calculations::ProgressiveTaxCalculator;
use crate::calculations::common::clamp_money;
use crate::models::RegimeConfig;

/// Iteration budget and acceptance threshold for the solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub max_iterations: u32,
    /// Largest accepted gap between implied and received net income.
    pub tolerance: Decimal,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tolerance: Decimal::ONE,
        }
    }
}

/// Outcome of a gross-from-net solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossIncomeSolution {
    pub gross_income: Decimal,
    /// Number of forward tax evaluations performed.
    pub iterations: u32,
    pub converged: bool,
    /// Received net minus implied net at the last evaluated guess.
    pub residual: Decimal,
}

impl GrossIncomeSolution {
    fn zero() -> Self {
        Self {
            gross_income: Decimal::ZERO,
            iterations: 0,
            converged: true,
            residual: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReverseGrossIncomeSolver<'a> {
    calculator: ProgressiveTaxCalculator<'a>,
    options: SolverOptions,
}

impl<'a> ReverseGrossIncomeSolver<'a> {
    pub fn new(
        config: &'a RegimeConfig,
        options: SolverOptions,
    ) -> Self {
        Self {
            calculator: ProgressiveTaxCalculator::new(config),
            options,
        }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Finds the gross income whose after-tax amount is `net_received`.
    ///
    /// Non-positive input returns zero without iterating. When the budget
    /// runs out the last corrected guess is returned with `converged` set
    /// to false.
    pub fn solve(
        &self,
        net_received: Decimal,
        apply_professional_tax: bool,
        salary_months_count: u32,
    ) -> GrossIncomeSolution {
        let net_received = clamp_money(net_received);
        if net_received <= Decimal::ZERO {
            return GrossIncomeSolution::zero();
        }

        let mut gross_guess = net_received;
        let mut residual = Decimal::ZERO;

        for iteration in 1..=self.options.max_iterations {
            let breakdown =
                self.calculator
                    .calculate(gross_guess, apply_professional_tax, salary_months_count);
            let implied_net = gross_guess - breakdown.total_tax;
            residual = net_received - implied_net;

            trace!(
                iteration,
                %gross_guess,
                %implied_net,
                %residual,
                "gross income solver step"
            );

            if residual.abs() < self.options.tolerance {
                return GrossIncomeSolution {
                    gross_income: gross_guess,
                    iterations: iteration,
                    converged: true,
                    residual,
                };
            }

            gross_guess = clamp_money(gross_guess + residual);
        }

        warn!(
            %net_received,
            %gross_guess,
            %residual,
            max_iterations = self.options.max_iterations,
            "gross income solver did not converge; returning best estimate"
        );

        GrossIncomeSolution {
            gross_income: gross_guess,
            iterations: self.options.max_iterations,
            converged: false,
            residual,
        }
    }
}

/// Solves for gross income with the default iteration budget.
pub fn calculate_gross_from_net(
    net_received: Decimal,
    config: &RegimeConfig,
    apply_professional_tax: bool,
    salary_months_count: u32,
) -> GrossIncomeSolution {
    ReverseGrossIncomeSolver::new(config, SolverOptions::default()).solve(
        net_received,
        apply_professional_tax,
        salary_months_count,
    )
}
