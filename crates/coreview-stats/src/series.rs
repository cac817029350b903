//! Paired series extraction
//!
//! Statistics routines operate on a [`SeriesPair`]: two equal-length columns of
//! `x` and `y` values. Callers usually hold one of two shapes of data:
//!
//! - A [`CountMap`] from an integer feature value (e.g. number of friends) to an
//!   observed count or probability mass
//! - Two already-paired columns, e.g. rows of a two-column numeric array
//!
//! [`SeriesInput`] wraps either shape so that routines accept both and
//! normalize them once into a [`SeriesPair`].
//!
//! # Examples
//!
//! ```
//! use coreview_stats::series::{CountMap, SeriesInput, SeriesPair};
//!
//! let counts = CountMap::from([(3, 0.3), (1, 0.1), (2, 0.2)]);
//! let series = SeriesInput::from(&counts).to_series(None);
//! assert_eq!(series.x(), &[1.0, 2.0, 3.0]);
//! assert_eq!(series.y(), &[0.1, 0.2, 0.3]);
//!
//! let rows = SeriesPair::from_rows(&[[1.0, 10.0], [2.0, 20.0]]);
//! assert_eq!(rows.y(), &[10.0, 20.0]);
//! ```

use std::{borrow::Cow, collections::BTreeMap};

use crate::StatsError;

/// Sparse counts keyed by an integer feature value.
///
/// Iteration order is key-ascending, which is the order series extraction uses.
pub type CountMap = BTreeMap<i64, f64>;

/// Two equal-length columns of paired observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesPair {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SeriesPair {
    /// Pairs two columns, failing if their lengths differ.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, StatsError> {
        if x.len() != y.len() {
            return Err(StatsError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Builds a series from rows of a two-column array: column 0 is `x`,
    /// column 1 is `y`. Row order is kept as-is.
    #[must_use]
    pub fn from_rows(rows: &[[f64; 2]]) -> Self {
        let (x, y) = rows.iter().map(|&[x, y]| (x, y)).unzip();
        Self { x, y }
    }

    /// Builds a series from every entry of `counts`, ordered by key.
    #[must_use]
    pub fn from_counts(counts: &CountMap) -> Self {
        Self::from_entries(counts.iter())
    }

    /// Builds a series from the entries of `counts` whose key is at most `cutoff`.
    #[must_use]
    pub fn from_counts_up_to(counts: &CountMap, cutoff: i64) -> Self {
        Self::from_entries(counts.range(..=cutoff))
    }

    #[expect(clippy::cast_precision_loss)]
    fn from_entries<'a, I>(entries: I) -> Self
    where
        I: Iterator<Item = (&'a i64, &'a f64)>,
    {
        let (x, y) = entries.map(|(&key, &value)| (key as f64, value)).unzip();
        Self { x, y }
    }

    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of paired observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterates over `(x, y)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Computes the means and centered sums of squares and cross products
    /// needed by correlation and regression.
    #[expect(clippy::cast_precision_loss)]
    pub(crate) fn moments(&self) -> Moments {
        let n = self.len() as f64;
        let mean_x = self.x.iter().sum::<f64>() / n;
        let mean_y = self.y.iter().sum::<f64>() / n;
        let (sxx, syy, sxy) = self
            .iter()
            .fold((0.0, 0.0, 0.0), |(sxx, syy, sxy), (x, y)| {
                let dx = x - mean_x;
                let dy = y - mean_y;
                (sxx + dx * dx, syy + dy * dy, sxy + dx * dy)
            });
        Moments {
            mean_x,
            mean_y,
            sxx,
            syy,
            sxy,
        }
    }
}

/// Centered second moments of a [`SeriesPair`] (sums, not averages).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Moments {
    pub mean_x: f64,
    pub mean_y: f64,
    pub sxx: f64,
    pub syy: f64,
    pub sxy: f64,
}

/// Input accepted by the statistics routines.
///
/// A mapping is sorted by key (and optionally truncated at a cutoff) before
/// use; a series is used exactly as given.
#[derive(Debug, Clone, Copy, derive_more::From)]
pub enum SeriesInput<'a> {
    Mapping(&'a CountMap),
    Series(&'a SeriesPair),
}

impl<'a> SeriesInput<'a> {
    /// Normalizes the input into a [`SeriesPair`].
    ///
    /// `cutoff` drops mapping keys greater than it; it does not apply to
    /// [`SeriesInput::Series`].
    #[must_use]
    pub fn to_series(self, cutoff: Option<i64>) -> Cow<'a, SeriesPair> {
        match (self, cutoff) {
            (SeriesInput::Mapping(counts), Some(cutoff)) => {
                Cow::Owned(SeriesPair::from_counts_up_to(counts, cutoff))
            }
            (SeriesInput::Mapping(counts), None) => Cow::Owned(SeriesPair::from_counts(counts)),
            (SeriesInput::Series(series), _) => Cow::Borrowed(series),
        }
    }
}
