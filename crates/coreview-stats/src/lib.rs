//! Statistical building blocks for the co-review probability analysis.
//!
//! This crate provides the numeric core of the workspace:
//!
//! - **Binning**: Aggregate sparse integer-keyed counts into fixed-width bins
//! - **Series extraction**: Normalize count maps and two-column data into paired series
//! - **Correlation**: Pearson correlation coefficient with one- or two-sided p-values
//! - **Regression**: Ordinary least-squares linear fit with slope significance
//!
//! # Modules
//!
//! - [`binning`]: Fixed-width binning of count maps
//! - [`series`]: Count maps, paired series and the input abstraction over both
//! - [`correlation`]: Pearson correlation and confidence intervals
//! - [`regression`]: Degree-1 least-squares fits
//! - [`error`]: The shared [`StatsError`](error::StatsError) type
//!
//! # Examples
//!
//! ## Binning a count map
//!
//! ```
//! use coreview_stats::{binning::{bin_data, BinEdges}, series::CountMap};
//!
//! let counts = CountMap::from([(0, 1.0), (1, 2.0), (7, 3.0), (12, 4.0)]);
//! let edges = BinEdges::new(vec![0, 5, 10]).unwrap();
//! let binned = bin_data(&counts, &edges, &[0, 1]);
//! assert_eq!(binned[&5], 3.0);
//! assert_eq!(binned[&10], 4.0);
//! ```
//!
//! ## Correlating and fitting a count map
//!
//! ```
//! use coreview_stats::{
//!     correlation::{pearson, Alternative, DEFAULT_CUTOFF},
//!     regression::linear_regression,
//!     series::CountMap,
//! };
//!
//! let counts = CountMap::from([(0, 0.0), (1, 2.0), (2, 4.0), (3, 6.0)]);
//!
//! let corr = pearson(&counts, Alternative::TwoSided, DEFAULT_CUTOFF).unwrap();
//! assert!((corr.coefficient - 1.0).abs() < 1e-12);
//!
//! let fit = linear_regression(&counts).unwrap();
//! assert!((fit.slope - 2.0).abs() < 1e-9);
//! ```

pub mod binning;
pub mod correlation;
pub mod error;
pub mod regression;
pub mod series;

pub use self::error::StatsError;
