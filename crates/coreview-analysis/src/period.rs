//! Analysis time periods
//!
//! Each simulation run covers one `(start, end)` window of review dates. The
//! window's [`label`](TimePeriod::label) identifies its result files on disk
//! and its rows in reports.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A `(start, end)` date window with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimePeriod {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParsePeriodError {
    #[display("period '{input}' must be written as START:END")]
    MissingSeparator { input: String },
    #[display("invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        source: chrono::ParseError,
    },
    #[display("period ends ({end}) before it starts ({start})")]
    Reversed { start: NaiveDate, end: NaiveDate },
}

impl TimePeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ParsePeriodError> {
        if end < start {
            return Err(ParsePeriodError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `YYYY-MM-DD_YYYY-MM-DD`
    ///
    /// # Examples
    ///
    /// ```
    /// # use coreview_analysis::period::TimePeriod;
    /// let period: TimePeriod = "2015-01-01:2016-01-01".parse().unwrap();
    /// assert_eq!(period.label(), "2015-01-01_2016-01-01");
    /// assert_eq!(period.year_label(), "2015-2016");
    /// ```
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}_{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }

    /// `YYYY-YYYY`, used for chart ticks.
    #[must_use]
    pub fn year_label(&self) -> String {
        format!("{}-{}", self.start.format("%Y"), self.end.format("%Y"))
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep width/alignment flags working for table output
        f.pad(&self.label())
    }
}

impl FromStr for TimePeriod {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| ParsePeriodError::MissingSeparator {
                input: s.to_owned(),
            })?;
        let parse = |input: &str| {
            let input = input.trim();
            NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|source| {
                ParsePeriodError::InvalidDate {
                    input: input.to_owned(),
                    source,
                }
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }
}
