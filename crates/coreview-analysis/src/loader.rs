//! Loading simulated probabilities per period
//!
//! The Monte Carlo stage writes, for every analysis period, two count maps:
//! the estimated probability of outcome 0 and of outcome 1 given that `i`
//! friends reviewed the same business. The comparison pipeline only depends on
//! the [`ProbabilityLoader`] trait, so tests and other storage formats can
//! provide data without touching the filesystem.
//!
//! # File Layout
//!
//! [`JsonProbabilityStore`] reads one JSON object per outcome:
//!
//! ```text
//! {dir}/2015-01-01_2016-01-01_prob_0.json   {"0": 0.12, "1": 0.08, "2": 0.05, ...}
//! {dir}/2015-01-01_2016-01-01_prob_1.json
//! ```

use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use coreview_stats::series::CountMap;

use crate::period::TimePeriod;

/// The two outcome series of one period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutcomePair<T> {
    /// P(0 | i)
    pub prob0: T,
    /// P(1 | i)
    pub prob1: T,
}

impl<T> OutcomePair<T> {
    #[must_use]
    pub fn new(prob0: T, prob1: T) -> Self {
        Self { prob0, prob1 }
    }

    pub fn as_ref(&self) -> OutcomePair<&T> {
        OutcomePair {
            prob0: &self.prob0,
            prob1: &self.prob1,
        }
    }

    pub fn map<U, F>(self, mut f: F) -> OutcomePair<U>
    where
        F: FnMut(T) -> U,
    {
        OutcomePair {
            prob0: f(self.prob0),
            prob1: f(self.prob1),
        }
    }

    /// Iterates as `(outcome index, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &T)> {
        [(0, &self.prob0), (1, &self.prob1)].into_iter()
    }
}

/// Errors raised while loading a period's data.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("no data for period {period}: cannot open {}", path.display())]
    MissingPeriodData {
        period: TimePeriod,
        path: PathBuf,
        source: io::Error,
    },
    #[display("malformed data for period {period} in {}", path.display())]
    Malformed {
        period: TimePeriod,
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Source of the paired probability maps for a period.
pub trait ProbabilityLoader {
    fn load(&self, period: &TimePeriod) -> Result<OutcomePair<CountMap>, LoadError>;
}

impl<F> ProbabilityLoader for F
where
    F: Fn(&TimePeriod) -> Result<OutcomePair<CountMap>, LoadError>,
{
    fn load(&self, period: &TimePeriod) -> Result<OutcomePair<CountMap>, LoadError> {
        self(period)
    }
}

/// Reads `{label}_prob_{0,1}.json` files from a results directory.
#[derive(Debug, Clone)]
pub struct JsonProbabilityStore {
    dir: PathBuf,
}

impl JsonProbabilityStore {
    pub fn new<P>(dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `outcome` (0 or 1) for `period`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use coreview_analysis::{loader::JsonProbabilityStore, period::TimePeriod};
    /// let store = JsonProbabilityStore::new("results");
    /// let period: TimePeriod = "2015-01-01:2016-01-01".parse().unwrap();
    /// assert_eq!(
    ///     store.path_for(&period, 1),
    ///     std::path::Path::new("results/2015-01-01_2016-01-01_prob_1.json"),
    /// );
    /// ```
    #[must_use]
    pub fn path_for(&self, period: &TimePeriod, outcome: u8) -> PathBuf {
        self.dir.join(format!("{}_prob_{outcome}.json", period.label()))
    }

    fn load_outcome(&self, period: &TimePeriod, outcome: u8) -> Result<CountMap, LoadError> {
        let path = self.path_for(period, outcome);
        log::debug!("reading {}", path.display());
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(source) => {
                return Err(LoadError::MissingPeriodData {
                    period: *period,
                    path,
                    source,
                });
            }
        };
        serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Malformed {
            period: *period,
            path,
            source,
        })
    }
}

impl ProbabilityLoader for JsonProbabilityStore {
    fn load(&self, period: &TimePeriod) -> Result<OutcomePair<CountMap>, LoadError> {
        Ok(OutcomePair {
            prob0: self.load_outcome(period, 0)?,
            prob1: self.load_outcome(period, 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn period() -> TimePeriod {
        "2015-01-01:2016-01-01".parse().unwrap()
    }

    #[test]
    fn test_store_reads_both_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProbabilityStore::new(dir.path());
        fs::write(store.path_for(&period(), 0), r#"{"0": 0.5, "3": 0.25}"#).unwrap();
        fs::write(store.path_for(&period(), 1), r#"{"12": 0.125}"#).unwrap();

        let data = store.load(&period()).unwrap();
        assert_eq!(data.prob0, CountMap::from([(0, 0.5), (3, 0.25)]));
        assert_eq!(data.prob1, CountMap::from([(12, 0.125)]));
    }

    #[test]
    fn test_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProbabilityStore::new(dir.path());
        fs::write(store.path_for(&period(), 0), "{}").unwrap();

        match store.load(&period()) {
            Err(LoadError::MissingPeriodData { path, .. }) => {
                assert!(path.ends_with("2015-01-01_2016-01-01_prob_1.json"));
            }
            other => panic!("expected missing data, got {other:?}"),
        }
    }

    #[test]
    fn test_store_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProbabilityStore::new(dir.path());
        fs::write(store.path_for(&period(), 0), r#"{"zero": 1.0}"#).unwrap();

        assert!(matches!(store.load(&period()), Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_closure_loader() {
        let loader = |_: &TimePeriod| -> Result<_, LoadError> {
            Ok(OutcomePair::new(
                CountMap::from([(1, 1.0)]),
                CountMap::from([(2, 2.0)]),
            ))
        };
        let data = loader.load(&period()).unwrap();
        assert_eq!(data.prob1[&2], 2.0);
    }

    #[test]
    fn test_outcome_pair_helpers() {
        let pair = OutcomePair::new(2, 3).map(|v| v * 10);
        assert_eq!(pair, OutcomePair::new(20, 30));
        let collected: Vec<_> = pair.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(collected, vec![(0, 20), (1, 30)]);
    }
}
