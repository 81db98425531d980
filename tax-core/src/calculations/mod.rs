//! Tax calculations: the forward progressive calculator and the solvers,
//! projections and comparisons built on top of it.
//!
//! Every calculator borrows an immutable [`RegimeConfig`](crate::RegimeConfig)
//! and performs no I/O, so all of them can be used concurrently.

pub mod common;
pub mod comparator;
pub mod progressive;
pub mod projection;
pub mod reverse;

pub use comparator::{ComparatorOptions, RegimeComparator, compare_regimes};
pub use progressive::{ProgressiveTaxCalculator, calculate_tax};
pub use projection::{RECENT_RECURRING_WINDOW, YearEndProjectionEstimator, remaining_months};
pub use reverse::{
    GrossIncomeSolution, ReverseGrossIncomeSolver, SolverOptions, calculate_gross_from_net,
};
