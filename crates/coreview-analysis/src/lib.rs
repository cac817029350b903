//! Per-period comparison of simulated co-review probabilities
//!
//! This crate runs the two outcome series of every analysis period through the
//! binning and statistics pipeline of [`coreview_stats`] and reports how they
//! differ.
//!
//! # Overview
//!
//! 1. **Periods** ([`period::TimePeriod`]): `(start, end)` windows with stable labels
//! 2. **Loading** ([`loader::ProbabilityLoader`]): fetch `P(0|i)` and `P(1|i)` for a
//!    period, from JSON files ([`loader::JsonProbabilityStore`]) or any closure
//! 3. **Comparison** ([`compare::compare_over_periods`]): bin both series, fit
//!    correlation and regression, and collect the results in input order
//! 4. **Reporting** ([`report`]): fixed-width text table, CSV, and JSON records
//!
//! # Examples
//!
//! ```no_run
//! use coreview_analysis::{
//!     compare::{CompareConfig, compare_over_periods},
//!     loader::JsonProbabilityStore,
//!     period::TimePeriod,
//!     report,
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonProbabilityStore::new("results/monte_carlo_prob0");
//! let periods: Vec<TimePeriod> = vec![
//!     "2012-01-01:2013-01-01".parse()?,
//!     "2013-01-01:2014-01-01".parse()?,
//! ];
//!
//! let report = compare_over_periods(periods, &CompareConfig::default(), &store)?;
//! print!("{}", report::table_string(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod compare;
pub mod loader;
pub mod period;
pub mod report;
