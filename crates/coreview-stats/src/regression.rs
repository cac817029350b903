//! Ordinary least-squares linear regression
//!
//! Fits `y = slope * x + intercept` to a paired series and reports how well
//! the line explains the data.
//!
//! # Examples
//!
//! ```
//! use coreview_stats::{regression::linear_regression, series::CountMap};
//!
//! let counts = CountMap::from([(0, 1.0), (1, 3.0), (2, 5.0)]);
//! let fit = linear_regression(&counts).unwrap();
//! assert!((fit.slope - 2.0).abs() < 1e-9);
//! assert!((fit.intercept - 1.0).abs() < 1e-9);
//! assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
//! ```

use crate::{
    StatsError,
    correlation::{Alternative, correlation_p_value},
    series::{SeriesInput, SeriesPair},
};

/// Least-squares fit of a degree-1 polynomial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation of the fitted data; 0 when `y` is constant.
    pub r_value: f64,
    /// Two-sided p-value for the null hypothesis that the slope is zero.
    pub p_value: f64,
    /// Standard error of the slope estimate.
    pub std_err: f64,
}

impl LinearRegression {
    /// Fits a line to `series`.
    ///
    /// Fails with [`StatsError::InsufficientData`] for fewer than two points
    /// and [`StatsError::SingularFit`] when every `x` is identical.
    #[expect(clippy::cast_precision_loss)]
    pub fn from_series(series: &SeriesPair) -> Result<Self, StatsError> {
        let n = series.len();
        if n < 2 {
            return Err(StatsError::InsufficientData {
                required: 2,
                actual: n,
            });
        }

        let m = series.moments();
        if m.sxx == 0.0 {
            return Err(StatsError::SingularFit);
        }

        let slope = m.sxy / m.sxx;
        let intercept = m.mean_y - slope * m.mean_x;
        let r_value = if m.syy == 0.0 {
            0.0
        } else {
            (m.sxy / (m.sxx.sqrt() * m.syy.sqrt())).clamp(-1.0, 1.0)
        };

        let (p_value, std_err) = if n == 2 {
            // A line through two points is exact
            let p_value = if series.y()[0] == series.y()[1] {
                1.0
            } else {
                0.0
            };
            (p_value, 0.0)
        } else {
            let df = n - 2;
            let p_value = correlation_p_value(r_value, df, Alternative::TwoSided)?;
            let residual = (1.0 - r_value * r_value).max(0.0);
            let std_err = (residual * m.syy / m.sxx / df as f64).sqrt();
            (p_value, std_err)
        };

        Ok(Self {
            slope,
            intercept,
            r_value,
            p_value,
            std_err,
        })
    }

    /// Evaluates the fitted line at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Least-squares line through `input`.
///
/// Count maps are ordered by key; no cutoff is applied.
pub fn linear_regression<'a, I>(input: I) -> Result<LinearRegression, StatsError>
where
    I: Into<SeriesInput<'a>>,
{
    let series = input.into().to_series(None);
    LinearRegression::from_series(&series)
}
