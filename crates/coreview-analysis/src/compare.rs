//! Comparing the two outcome series across time periods
//!
//! For every period, the paired probability maps are binned with the same
//! [`Binner`], then each binned series is summarized by a Pearson correlation
//! and a least-squares line. The difference `P(0|i) - P(1|i)` of those
//! summaries is what the report prints.
//!
//! Periods are processed in input order and the first failure stops the run.
//! A binned series with no variation (e.g. every bin zero) cannot be
//! correlated, so such a period ends the run with [`CompareError::Stats`].
//!
//! The correlation only sees bins up to [`CompareConfig::cutoff`]; the
//! regression is fitted on every bin.

use coreview_stats::{
    StatsError,
    binning::{BinnedCounts, Binner},
    correlation::{Alternative, Correlation, DEFAULT_CUTOFF, pearson},
    regression::{LinearRegression, linear_regression},
};
use serde::Serialize;

use crate::{
    loader::{LoadError, OutcomePair, ProbabilityLoader},
    period::TimePeriod,
};

/// Keys skipped when binning unless configured otherwise.
pub const DEFAULT_IGNORED: [i64; 2] = [0, 1];

#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    pub binner: Binner,
    pub alternative: Alternative,
    pub cutoff: i64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            binner: Binner::default().with_ignored(DEFAULT_IGNORED),
            alternative: Alternative::TwoSided,
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CompareError {
    #[display("failed to load data for period {period}")]
    Load {
        period: TimePeriod,
        source: LoadError,
    },
    #[display("statistics failed for period {period}, series P({outcome}|i)")]
    Stats {
        period: TimePeriod,
        outcome: u8,
        source: StatsError,
    },
}

/// Correlation and regression of one binned series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub correlation: Correlation,
    pub regression: LinearRegression,
}

impl SeriesSummary {
    pub fn from_binned(binned: &BinnedCounts, config: &CompareConfig) -> Result<Self, StatsError> {
        Ok(Self {
            correlation: pearson(binned, config.alternative, config.cutoff)?,
            regression: linear_regression(binned)?,
        })
    }
}

/// `P(0|i)` minus `P(1|i)` for each reported statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryDiff {
    pub coefficient: f64,
    pub p_value: f64,
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodComparison {
    pub period: TimePeriod,
    pub binned: OutcomePair<BinnedCounts>,
    pub summary: OutcomePair<SeriesSummary>,
}

impl PeriodComparison {
    #[must_use]
    pub fn diff(&self) -> SummaryDiff {
        let OutcomePair { prob0, prob1 } = &self.summary;
        SummaryDiff {
            coefficient: prob0.correlation.coefficient - prob1.correlation.coefficient,
            p_value: prob0.correlation.p_value - prob1.correlation.p_value,
            slope: prob0.regression.slope - prob1.regression.slope,
            intercept: prob0.regression.intercept - prob1.regression.intercept,
        }
    }
}

/// Loads, bins and summarizes a single period.
pub fn compare_period<L>(
    period: TimePeriod,
    config: &CompareConfig,
    loader: &L,
) -> Result<PeriodComparison, CompareError>
where
    L: ProbabilityLoader + ?Sized,
{
    let data = loader
        .load(&period)
        .map_err(|source| CompareError::Load { period, source })?;
    let binned = data.map(|counts| config.binner.bin(&counts));
    for (outcome, bins) in binned.iter() {
        log::debug!(
            "{period} P({outcome}|i): binned total {:.6}",
            bins.values().sum::<f64>()
        );
    }

    let summarize = |outcome: u8, bins: &BinnedCounts| {
        SeriesSummary::from_binned(bins, config).map_err(|source| CompareError::Stats {
            period,
            outcome,
            source,
        })
    };
    let summary = OutcomePair {
        prob0: summarize(0, &binned.prob0)?,
        prob1: summarize(1, &binned.prob1)?,
    };
    log::info!(
        "{period}: r = {:.3} / {:.3}, slope = {:.3} / {:.3}",
        summary.prob0.correlation.coefficient,
        summary.prob1.correlation.coefficient,
        summary.prob0.regression.slope,
        summary.prob1.regression.slope,
    );

    Ok(PeriodComparison {
        period,
        binned,
        summary,
    })
}

/// Lazy per-period comparisons, stopping after the first error.
#[derive(Debug)]
pub struct PeriodComparisons<'a, I, L: ?Sized> {
    periods: I,
    config: &'a CompareConfig,
    loader: &'a L,
    failed: bool,
}

impl<I, L> Iterator for PeriodComparisons<'_, I, L>
where
    I: Iterator<Item = TimePeriod>,
    L: ProbabilityLoader + ?Sized,
{
    type Item = Result<PeriodComparison, CompareError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let period = self.periods.next()?;
        let result = compare_period(period, self.config, self.loader);
        self.failed = result.is_err();
        Some(result)
    }
}

pub fn comparisons<'a, P, L>(
    periods: P,
    config: &'a CompareConfig,
    loader: &'a L,
) -> PeriodComparisons<'a, P::IntoIter, L>
where
    P: IntoIterator<Item = TimePeriod>,
    L: ProbabilityLoader + ?Sized,
{
    PeriodComparisons {
        periods: periods.into_iter(),
        config,
        loader,
        failed: false,
    }
}

/// Per-period results of a full run, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonReport {
    periods: Vec<PeriodComparison>,
}

impl ComparisonReport {
    #[must_use]
    pub fn periods(&self) -> &[PeriodComparison] {
        &self.periods
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn correlations(&self) -> impl Iterator<Item = OutcomePair<Correlation>> + '_ {
        self.periods.iter().map(|p| p.summary.map(|s| s.correlation))
    }

    pub fn regressions(&self) -> impl Iterator<Item = OutcomePair<LinearRegression>> + '_ {
        self.periods.iter().map(|p| p.summary.map(|s| s.regression))
    }

    pub fn diffs(&self) -> impl Iterator<Item = (TimePeriod, SummaryDiff)> + '_ {
        self.periods.iter().map(|p| (p.period, p.diff()))
    }
}

impl FromIterator<PeriodComparison> for ComparisonReport {
    fn from_iter<T: IntoIterator<Item = PeriodComparison>>(iter: T) -> Self {
        Self {
            periods: iter.into_iter().collect(),
        }
    }
}

/// Runs every period through the pipeline and collects the results.
///
/// # Examples
///
/// ```
/// use coreview_analysis::{
///     compare::{CompareConfig, compare_over_periods},
///     loader::{LoadError, OutcomePair},
///     period::TimePeriod,
/// };
/// use coreview_stats::series::CountMap;
///
/// let counts: CountMap = (0..60_i32)
///     .map(|k| (i64::from(k), 1.0 / f64::from(k + 1)))
///     .collect();
/// let loader = |_: &TimePeriod| -> Result<_, LoadError> {
///     Ok(OutcomePair::new(counts.clone(), counts.clone()))
/// };
/// let period: TimePeriod = "2015-01-01:2016-01-01".parse().unwrap();
///
/// let report = compare_over_periods([period], &CompareConfig::default(), &loader).unwrap();
/// let (_, diff) = report.diffs().next().unwrap();
/// assert_eq!(diff.slope, 0.0);
/// ```
pub fn compare_over_periods<P, L>(
    periods: P,
    config: &CompareConfig,
    loader: &L,
) -> Result<ComparisonReport, CompareError>
where
    P: IntoIterator<Item = TimePeriod>,
    L: ProbabilityLoader + ?Sized,
{
    comparisons(periods, config, loader).collect()
}
