//! Fixed-width binning for sparse count maps
//!
//! Simulation output is a sparse [`CountMap`] keyed by a small integer (the
//! number of friends who reviewed the same business). Binning aggregates those
//! keys into a handful of ranges so that sparsely populated high keys do not
//! dominate the downstream fit.
//!
//! # Bin Layout
//!
//! Bins are described by [`BinEdges`]: a strictly ascending list of lower
//! bounds. Bin `i` covers `edges[i]` up to `edges[i + 1]`; the last bin is
//! open-ended.
//!
//! ```text
//! edges:   0     5     10    ...   50
//! bins:    [0,5] [5,10] [10,15] ... [50,+inf)
//! ```
//!
//! # Boundary Policy
//!
//! Historical results were produced with both ends inclusive, so a key that
//! equals an interior edge is counted in **both** adjacent bins. That remains
//! the default ([`BoundaryPolicy::InclusiveBoth`]) so prior results are
//! reproducible. [`BoundaryPolicy::HalfOpen`] puts every key in exactly one
//! bin and must be chosen explicitly.
//!
//! # Examples
//!
//! ```
//! use coreview_stats::{
//!     binning::{BinEdges, Binner, BoundaryPolicy},
//!     series::CountMap,
//! };
//!
//! let counts = CountMap::from([(3, 1.0), (5, 10.0), (8, 100.0)]);
//! let edges = BinEdges::new(vec![0, 5, 10]).unwrap();
//!
//! // Key 5 lands in both [0, 5] and [5, 10]
//! let binned = Binner::new(edges.clone()).bin(&counts);
//! assert_eq!(binned[&0], 11.0);
//! assert_eq!(binned[&5], 110.0);
//!
//! // Half-open bins count it once
//! let binned = Binner::new(edges)
//!     .with_boundary_policy(BoundaryPolicy::HalfOpen)
//!     .bin(&counts);
//! assert_eq!(binned[&0], 1.0);
//! assert_eq!(binned[&5], 110.0);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::{StatsError, series::CountMap};

/// Aggregated counts keyed by bin lower bound.
///
/// Contains an entry for every declared bin, including empty ones.
pub type BinnedCounts = BTreeMap<i64, f64>;

/// Strictly ascending, non-empty list of bin lower bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinEdges {
    lower_bounds: Vec<i64>,
}

impl Default for BinEdges {
    /// `0, 5, 10, ..., 50`
    fn default() -> Self {
        Self {
            lower_bounds: (0..=50).step_by(5).collect(),
        }
    }
}

impl BinEdges {
    /// Validates and wraps a list of lower bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use coreview_stats::binning::BinEdges;
    /// assert!(BinEdges::new(vec![0, 5, 10]).is_ok());
    /// assert!(BinEdges::new(vec![]).is_err());
    /// assert!(BinEdges::new(vec![0, 5, 5]).is_err());
    /// ```
    pub fn new(lower_bounds: Vec<i64>) -> Result<Self, StatsError> {
        if lower_bounds.is_empty() {
            return Err(StatsError::InvalidBinSpec {
                reason: "bins must not be empty".to_owned(),
            });
        }
        if let Some(pair) = lower_bounds.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(StatsError::InvalidBinSpec {
                reason: format!(
                    "bins must be strictly ascending, found {} followed by {}",
                    pair[0], pair[1]
                ),
            });
        }
        Ok(Self { lower_bounds })
    }

    /// Builds `start, start + width, ...` up to and including `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use coreview_stats::binning::BinEdges;
    /// let edges = BinEdges::fixed_width(0, 50, 5).unwrap();
    /// assert_eq!(edges, BinEdges::default());
    /// ```
    pub fn fixed_width(start: i64, end: i64, width: i64) -> Result<Self, StatsError> {
        if width <= 0 {
            return Err(StatsError::InvalidBinSpec {
                reason: format!("bin width must be positive, got {width}"),
            });
        }
        if end < start {
            return Err(StatsError::InvalidBinSpec {
                reason: format!("bin range end {end} is before start {start}"),
            });
        }
        let lower_bounds = std::iter::successors(Some(start), |&edge| edge.checked_add(width))
            .take_while(|&edge| edge <= end)
            .collect();
        Self::new(lower_bounds)
    }

    #[must_use]
    pub fn lower_bounds(&self) -> &[i64] {
        &self.lower_bounds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lower_bounds.len()
    }

    /// Always `false`: construction rejects empty edge lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lower_bounds.is_empty()
    }

    /// Iterates over `(lower, upper)` pairs. The last bin has no upper bound.
    pub fn ranges(&self) -> impl Iterator<Item = (i64, Option<i64>)> + '_ {
        self.lower_bounds
            .iter()
            .enumerate()
            .map(|(i, &lower)| (lower, self.lower_bounds.get(i + 1).copied()))
    }

    /// Smallest distance between adjacent edges, or `None` for a single bin.
    #[must_use]
    pub fn min_width(&self) -> Option<i64> {
        self.lower_bounds
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .min()
    }
}

/// How keys that fall exactly on a bin edge are assigned.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// `lower <= key <= upper`: interior edges are counted in two bins.
    #[default]
    InclusiveBoth,
    /// `lower <= key < upper`: every key lands in at most one bin.
    HalfOpen,
}

impl BoundaryPolicy {
    fn contains(self, lower: i64, upper: Option<i64>, key: i64) -> bool {
        if key < lower {
            return false;
        }
        match (self, upper) {
            (_, None) => true,
            (BoundaryPolicy::InclusiveBoth, Some(upper)) => key <= upper,
            (BoundaryPolicy::HalfOpen, Some(upper)) => key < upper,
        }
    }
}

/// Reusable binning configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binner {
    edges: BinEdges,
    ignore_exact: BTreeSet<i64>,
    policy: BoundaryPolicy,
}

impl Binner {
    #[must_use]
    pub fn new(edges: BinEdges) -> Self {
        Self {
            edges,
            ignore_exact: BTreeSet::new(),
            policy: BoundaryPolicy::default(),
        }
    }

    /// Keys to skip entirely, regardless of which bin they would fall in.
    #[must_use]
    pub fn with_ignored<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        self.ignore_exact.extend(keys);
        self
    }

    #[must_use]
    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    #[must_use]
    pub fn ignored(&self) -> &BTreeSet<i64> {
        &self.ignore_exact
    }

    #[must_use]
    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Aggregates `counts` into the configured bins.
    ///
    /// Keys below the first edge and ignored keys contribute nothing.
    #[must_use]
    pub fn bin(&self, counts: &CountMap) -> BinnedCounts {
        let mut binned: BinnedCounts = self
            .edges
            .lower_bounds()
            .iter()
            .map(|&lower| (lower, 0.0))
            .collect();

        for (&key, &value) in counts {
            if self.ignore_exact.contains(&key) {
                continue;
            }
            for (lower, upper) in self.edges.ranges() {
                if self.policy.contains(lower, upper, key)
                    && let Some(total) = binned.get_mut(&lower)
                {
                    *total += value;
                }
            }
        }

        binned
    }
}

/// Bins `counts` with inclusive-both-ends boundaries, skipping `ignore_exact`.
///
/// Shorthand for [`Binner::bin`] with the default boundary policy.
#[must_use]
pub fn bin_data(counts: &CountMap, edges: &BinEdges, ignore_exact: &[i64]) -> BinnedCounts {
    Binner::new(edges.clone())
        .with_ignored(ignore_exact.iter().copied())
        .bin(counts)
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64;

    use super::*;

    fn edges(bounds: &[i64]) -> BinEdges {
        BinEdges::new(bounds.to_vec()).unwrap()
    }

    #[test]
    fn test_reference_example() {
        let counts = CountMap::from([(0, 1.0), (1, 2.0), (7, 3.0), (12, 4.0)]);
        let binned = bin_data(&counts, &edges(&[0, 5, 10]), &[0, 1]);
        assert_eq!(binned, BinnedCounts::from([(0, 0.0), (5, 3.0), (10, 4.0)]));
    }

    #[test]
    fn test_interior_edge_counted_in_both_bins() {
        let counts = CountMap::from([(10, 7.0)]);
        let binned = bin_data(&counts, &edges(&[0, 5, 10, 15]), &[]);
        assert_eq!(binned[&5], 7.0);
        assert_eq!(binned[&10], 7.0);
        assert_eq!(binned[&0], 0.0);
        assert_eq!(binned[&15], 0.0);
    }

    #[test]
    fn test_half_open_counts_edge_once() {
        let counts = CountMap::from([(10, 7.0)]);
        let binned = Binner::new(edges(&[0, 5, 10, 15]))
            .with_boundary_policy(BoundaryPolicy::HalfOpen)
            .bin(&counts);
        assert_eq!(binned[&5], 0.0);
        assert_eq!(binned[&10], 7.0);
    }

    #[test]
    fn test_keys_below_first_edge_are_dropped() {
        let counts = CountMap::from([(-3, 5.0), (2, 1.0)]);
        let binned = bin_data(&counts, &edges(&[0, 5]), &[]);
        assert_eq!(binned.values().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_last_bin_is_open_ended() {
        let counts = CountMap::from([(1_000, 2.5)]);
        let binned = bin_data(&counts, &BinEdges::default(), &[]);
        assert_eq!(binned[&50], 2.5);
    }

    #[test]
    fn test_every_declared_bin_present() {
        let binned = bin_data(&CountMap::new(), &BinEdges::default(), &[]);
        assert_eq!(binned.len(), 11);
        assert!(binned.values().all(|&v| v == 0.0));
    }

    #[test]
    fn test_invalid_edges() {
        assert!(matches!(
            BinEdges::new(vec![]),
            Err(StatsError::InvalidBinSpec { .. })
        ));
        assert!(matches!(
            BinEdges::new(vec![0, 10, 5]),
            Err(StatsError::InvalidBinSpec { .. })
        ));
        assert!(BinEdges::fixed_width(0, 10, 0).is_err());
        assert!(BinEdges::fixed_width(10, 0, 5).is_err());
    }

    #[test]
    fn test_fixed_width_excludes_past_end() {
        let edges = BinEdges::fixed_width(0, 12, 5).unwrap();
        assert_eq!(edges.lower_bounds(), &[0, 5, 10]);
        assert_eq!(edges.min_width(), Some(5));
    }

    #[test]
    fn test_binning_is_pure() {
        let counts = CountMap::from([(2, 1.0), (5, 2.0), (33, 3.0)]);
        let binner = Binner::new(BinEdges::default()).with_ignored([0, 1]);
        assert_eq!(binner.bin(&counts), binner.bin(&counts));
    }

    #[test]
    fn test_total_preserved_without_edge_keys() {
        let mut rng = Pcg64::seed_from_u64(0x5eed);
        let edges = BinEdges::default();
        let ignore = [0, 1];

        for _ in 0..100 {
            let mut counts = CountMap::new();
            for _ in 0..rng.random_range(1..40) {
                let key = rng.random_range(0..120);
                // Interior edges are counted twice under the default policy
                if key % 5 == 0 && (5..=50).contains(&key) {
                    continue;
                }
                counts.insert(key, rng.random_range(0.0..1.0));
            }

            let expected = counts
                .iter()
                .filter(|(key, _)| !ignore.contains(key))
                .map(|(_, value)| value)
                .sum::<f64>();
            let binned = bin_data(&counts, &edges, &ignore);
            let total = binned.values().sum::<f64>();
            assert!(
                (total - expected).abs() < 1e-9,
                "binned total {total} differs from input total {expected}"
            );
        }
    }

    #[test]
    fn test_half_open_preserves_total() {
        let mut rng = Pcg64::seed_from_u64(7);
        let binner = Binner::new(BinEdges::default())
            .with_boundary_policy(BoundaryPolicy::HalfOpen);

        for _ in 0..100 {
            let counts: CountMap = (0..rng.random_range(1..40))
                .map(|_| (rng.random_range(0..120), rng.random_range(0.0..1.0)))
                .collect();
            let expected = counts.values().sum::<f64>();
            let total = binner.bin(&counts).values().sum::<f64>();
            assert!((total - expected).abs() < 1e-9);
        }
    }
}
