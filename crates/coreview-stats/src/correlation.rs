//! Pearson correlation with hypothesis tests
//!
//! Measures the linear association between two paired series and tests it
//! against the null hypothesis of zero correlation.
//!
//! # P-values
//!
//! Under the null hypothesis, `t = r * sqrt((n - 2) / (1 - r^2))` follows a
//! Student-t distribution with `n - 2` degrees of freedom. The p-value is the
//! tail probability selected by the [`Alternative`]:
//!
//! - [`Alternative::Less`]: lower tail, small when `r` is strongly negative
//! - [`Alternative::Greater`]: upper tail, small when `r` is strongly positive
//! - [`Alternative::TwoSided`]: both tails
//!
//! With exactly two observations `r` is always ±1 and carries no evidence, so
//! the p-value is 1.
//!
//! # Examples
//!
//! ```
//! use coreview_stats::{
//!     correlation::{pearson, Alternative},
//!     series::SeriesPair,
//! };
//!
//! let series = SeriesPair::from_rows(&[[1.0, 2.1], [2.0, 3.9], [3.0, 6.2], [4.0, 7.8]]);
//! let corr = pearson(&series, Alternative::Greater, 100).unwrap();
//! assert!(corr.coefficient > 0.99);
//! assert!(corr.p_value < 0.01);
//! ```

use std::{fmt, str::FromStr};

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::{
    StatsError,
    series::{SeriesInput, SeriesPair},
};

/// Default largest key kept when correlating a count map.
pub const DEFAULT_CUTOFF: i64 = 100;

/// Alternative hypothesis of a correlation test.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alternative {
    #[default]
    TwoSided,
    /// The correlation is negative.
    Less,
    /// The correlation is positive.
    Greater,
}

impl Alternative {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Alternative::TwoSided => "two-sided",
            Alternative::Less => "less",
            Alternative::Greater => "greater",
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown alternative '{input}', expected one of: less, greater, two-sided")]
pub struct ParseAlternativeError {
    input: String,
}

impl FromStr for Alternative {
    type Err = ParseAlternativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two-sided" => Ok(Alternative::TwoSided),
            "less" => Ok(Alternative::Less),
            "greater" => Ok(Alternative::Greater),
            _ => Err(ParseAlternativeError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Result of a Pearson correlation test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    /// Pearson's r, in `[-1, 1]`.
    pub coefficient: f64,
    /// Probability of a correlation at least this extreme under the null, in `[0, 1]`.
    pub p_value: f64,
    /// Hypothesis the p-value was computed for.
    pub alternative: Alternative,
    /// Number of paired observations.
    pub n: usize,
}

impl Correlation {
    /// Computes Pearson's r and its p-value for `series`.
    pub fn from_series(series: &SeriesPair, alternative: Alternative) -> Result<Self, StatsError> {
        let n = series.len();
        if n < 2 {
            return Err(StatsError::InsufficientData {
                required: 2,
                actual: n,
            });
        }

        let m = series.moments();
        if m.sxx == 0.0 || m.syy == 0.0 {
            return Err(StatsError::ConstantInput);
        }
        let coefficient = (m.sxy / (m.sxx.sqrt() * m.syy.sqrt())).clamp(-1.0, 1.0);

        let p_value = if n == 2 {
            1.0
        } else {
            correlation_p_value(coefficient, n - 2, alternative)?
        };

        Ok(Self {
            coefficient,
            p_value,
            alternative,
            n,
        })
    }

    /// Fisher-z confidence interval for the coefficient at `level` (e.g. `0.95`).
    ///
    /// One-sided alternatives give intervals that extend to -1 or 1.
    ///
    /// # Examples
    ///
    /// ```
    /// # use coreview_stats::{correlation::{pearson, Alternative}, series::SeriesPair};
    /// let rows = [[1.0, 1.0], [2.0, 3.0], [3.0, 2.0], [4.0, 5.0], [5.0, 4.0]];
    /// let series = SeriesPair::from_rows(&rows);
    /// let corr = pearson(&series, Alternative::TwoSided, 100).unwrap();
    /// let (low, high) = corr.confidence_interval(0.95).unwrap();
    /// assert!(low < corr.coefficient && corr.coefficient < high);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn confidence_interval(&self, level: f64) -> Result<(f64, f64), StatsError> {
        if self.n < 4 {
            return Err(StatsError::InsufficientData {
                required: 4,
                actual: self.n,
            });
        }
        if !(level > 0.0 && level < 1.0) {
            return Err(StatsError::InvalidConfidenceLevel { level });
        }

        let normal = Normal::new(0.0, 1.0).map_err(|e| StatsError::Distribution {
            reason: e.to_string(),
        })?;
        let z = self.coefficient.atanh();
        let se = 1.0 / ((self.n - 3) as f64).sqrt();

        let interval = match self.alternative {
            Alternative::TwoSided => {
                let h = normal.inverse_cdf(0.5 * (1.0 + level)) * se;
                ((z - h).tanh(), (z + h).tanh())
            }
            Alternative::Less => {
                let h = normal.inverse_cdf(level) * se;
                (-1.0, (z + h).tanh())
            }
            Alternative::Greater => {
                let h = normal.inverse_cdf(level) * se;
                ((z - h).tanh(), 1.0)
            }
        };
        Ok(interval)
    }
}

/// Pearson correlation of `input`.
///
/// Count maps are ordered by key and keys greater than `cutoff` are dropped;
/// paired series are used as given.
pub fn pearson<'a, I>(
    input: I,
    alternative: Alternative,
    cutoff: i64,
) -> Result<Correlation, StatsError>
where
    I: Into<SeriesInput<'a>>,
{
    let series = input.into().to_series(Some(cutoff));
    Correlation::from_series(&series, alternative)
}

/// Tail probability of Pearson's `r` under the null with `df = n - 2`.
///
/// `df` must be at least 1.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn correlation_p_value(
    r: f64,
    df: usize,
    alternative: Alternative,
) -> Result<f64, StatsError> {
    // Perfect correlation puts t at infinity; resolve the tails exactly
    if r.abs() >= 1.0 {
        let p = match alternative {
            Alternative::TwoSided => 0.0,
            Alternative::Less => f64::from(u8::from(r > 0.0)),
            Alternative::Greater => f64::from(u8::from(r < 0.0)),
        };
        return Ok(p);
    }

    let df = df as f64;
    let t = r * (df / ((1.0 - r) * (1.0 + r))).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution {
        reason: e.to_string(),
    })?;

    let p = match alternative {
        Alternative::TwoSided => 2.0 * dist.sf(t.abs()),
        Alternative::Less => dist.cdf(t),
        Alternative::Greater => dist.sf(t),
    };
    Ok(p.clamp(0.0, 1.0))
}
