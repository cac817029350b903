//! Text, CSV and JSON renderings of a comparison run
//!
//! The text table has one row per period with the `P(0|i) - P(1|i)`
//! differences printed to three significant digits:
//!
//! ```text
//! period                   |  coeff   | p-value  |  slope   |intercept
//! -------------------------------------------------------
//! 2015-01-01_2016-01-01    |  0.0414  | -0.0173  | 5.21e-05 | 0.00113
//! ```

use std::fmt;

use serde::Serialize;

use crate::{
    compare::{ComparisonReport, PeriodComparison, SeriesSummary, SummaryDiff},
    period::TimePeriod,
};

pub const SIGNIFICANT_DIGITS: usize = 3;

const PERIOD_WIDTH: usize = 25;
const CELL_WIDTH: usize = 10;
const SEPARATOR_WIDTH: usize = 55;

/// Formats `value` with `digits` significant digits in general notation.
///
/// Scientific notation is used when the decimal exponent is below -4 or at
/// least `digits - 1`. Trailing zeros are dropped, but fixed notation keeps
/// one digit after the point.
///
/// # Examples
///
/// ```
/// use coreview_analysis::report::format_significant;
///
/// assert_eq!(format_significant(-0.123456, 3), "-0.123");
/// assert_eq!(format_significant(2.0, 3), "2.0");
/// assert_eq!(format_significant(1234.5, 3), "1.23e+03");
/// assert_eq!(format_significant(0.00001234, 3), "1.23e-05");
/// ```
#[must_use]
pub fn format_significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_owned();
    }

    let digits = digits.max(1);
    // Round first so that e.g. 9.995 moves to the next exponent
    let scientific = format!("{value:.prec$e}", prec = digits - 1);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    let max_exponent = i32::try_from(digits).unwrap_or(i32::MAX) - 1;
    if exponent < -4 || exponent >= max_exponent {
        let mantissa = trim_fraction(mantissa, false);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    } else {
        let decimals = usize::try_from(max_exponent - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}"), true).to_owned()
    }
}

fn trim_fraction(s: &str, keep_one: bool) -> &str {
    let Some(dot) = s.find('.') else {
        return s;
    };
    let trimmed = s.trim_end_matches('0');
    if trimmed.len() == dot + 1 {
        if keep_one { &s[..=dot + 1] } else { &s[..dot] }
    } else {
        trimmed
    }
}

#[must_use]
pub fn table_header() -> String {
    format!(
        "{:PERIOD_WIDTH$}|{:^CELL_WIDTH$}|{:^CELL_WIDTH$}|{:^CELL_WIDTH$}|{:^CELL_WIDTH$}",
        "period", "coeff", "p-value", "slope", "intercept"
    )
}

#[must_use]
pub fn table_separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

#[must_use]
pub fn table_row(period: &TimePeriod, diff: &SummaryDiff) -> String {
    let cell = |v: f64| format_significant(v, SIGNIFICANT_DIGITS);
    format!(
        "{period:PERIOD_WIDTH$}|{:^CELL_WIDTH$}|{:^CELL_WIDTH$}|{:^CELL_WIDTH$}|{:^CELL_WIDTH$}",
        cell(diff.coefficient),
        cell(diff.p_value),
        cell(diff.slope),
        cell(diff.intercept),
    )
}

/// Header, separator and one row per period.
pub fn write_table<W>(w: &mut W, report: &ComparisonReport) -> fmt::Result
where
    W: fmt::Write,
{
    writeln!(w, "{}", table_header())?;
    writeln!(w, "{}", table_separator())?;
    for (period, diff) in report.diffs() {
        writeln!(w, "{}", table_row(&period, &diff))?;
    }
    Ok(())
}

/// Statistics of one outcome series, flattened for CSV and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeRecord {
    pub outcome: u8,
    pub coefficient: f64,
    pub p_value: f64,
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub std_err: f64,
}

impl OutcomeRecord {
    #[must_use]
    pub fn new(outcome: u8, summary: &SeriesSummary) -> Self {
        Self {
            outcome,
            coefficient: summary.correlation.coefficient,
            p_value: summary.correlation.p_value,
            slope: summary.regression.slope,
            intercept: summary.regression.intercept,
            r_value: summary.regression.r_value,
            std_err: summary.regression.std_err,
        }
    }
}

/// One period of a JSON report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRecord {
    pub label: String,
    pub period: TimePeriod,
    pub outcomes: Vec<OutcomeRecord>,
    pub diff: SummaryDiff,
}

impl From<&PeriodComparison> for PeriodRecord {
    fn from(comparison: &PeriodComparison) -> Self {
        Self {
            label: comparison.period.label(),
            period: comparison.period,
            outcomes: comparison
                .summary
                .iter()
                .map(|(outcome, summary)| OutcomeRecord::new(outcome, summary))
                .collect(),
            diff: comparison.diff(),
        }
    }
}

#[must_use]
pub fn records(report: &ComparisonReport) -> Vec<PeriodRecord> {
    report.periods().iter().map(PeriodRecord::from).collect()
}

pub const CSV_HEADER: &str = "period,outcome,coefficient,p_value,slope,intercept,r_value,std_err";

/// One line per period and outcome series.
pub fn write_csv<W>(w: &mut W, report: &ComparisonReport) -> fmt::Result
where
    W: fmt::Write,
{
    writeln!(w, "{CSV_HEADER}")?;
    for comparison in report.periods() {
        for (outcome, summary) in comparison.summary.iter() {
            let r = OutcomeRecord::new(outcome, summary);
            writeln!(
                w,
                "{},{},{},{},{},{},{},{}",
                comparison.period.label(),
                r.outcome,
                r.coefficient,
                r.p_value,
                r.slope,
                r.intercept,
                r.r_value,
                r.std_err,
            )?;
        }
    }
    Ok(())
}

/// [`write_csv`] into a new `String`.
pub fn csv_string(report: &ComparisonReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_csv(&mut out, report)?;
    Ok(out)
}

/// [`write_table`] into a new `String`.
pub fn table_string(report: &ComparisonReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_table(&mut out, report)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use coreview_stats::series::CountMap;

    use super::*;
    use crate::{
        compare::{CompareConfig, compare_over_periods},
        loader::{LoadError, OutcomePair},
    };

    fn report() -> ComparisonReport {
        let loader = |_: &TimePeriod| -> Result<_, LoadError> {
            let prob0: CountMap = (0..60_i32)
                .map(|k| (i64::from(k), 1.0 / f64::from(k + 1)))
                .collect();
            let prob1 = prob0.iter().map(|(&k, &v)| (k, v * 0.5)).collect();
            Ok(OutcomePair::new(prob0, prob1))
        };
        let periods: [TimePeriod; 2] = [
            "2015-01-01:2016-01-01".parse().unwrap(),
            "2016-01-01:2017-01-01".parse().unwrap(),
        ];
        compare_over_periods(periods, &CompareConfig::default(), &loader).unwrap()
    }

    #[test]
    fn test_format_significant_fixed() {
        assert_eq!(format_significant(0.0, 3), "0.0");
        assert_eq!(format_significant(-0.0, 3), "-0.0");
        assert_eq!(format_significant(2.0, 3), "2.0");
        assert_eq!(format_significant(-0.123_456, 3), "-0.123");
        assert_eq!(format_significant(12.34, 3), "12.3");
        assert_eq!(format_significant(10.0, 3), "10.0");
        assert_eq!(format_significant(0.0001, 3), "0.0001");
        assert_eq!(format_significant(0.5, 3), "0.5");
    }

    #[test]
    fn test_format_significant_scientific() {
        assert_eq!(format_significant(1234.5, 3), "1.23e+03");
        assert_eq!(format_significant(0.000_012_34, 3), "1.23e-05");
        assert_eq!(format_significant(100.0, 3), "1e+02");
        assert_eq!(format_significant(-250.0, 3), "-2.5e+02");
        // Rounding carries into the exponent
        assert_eq!(format_significant(99.96, 3), "1e+02");
    }

    #[test]
    fn test_format_significant_special() {
        assert_eq!(format_significant(f64::NAN, 3), "nan");
        assert_eq!(format_significant(f64::INFINITY, 3), "inf");
        assert_eq!(format_significant(f64::NEG_INFINITY, 3), "-inf");
        assert_eq!(format_significant(0.123, 0), "0.1");
    }

    #[test]
    fn test_table_layout() {
        assert_eq!(
            table_header(),
            "period                   |  coeff   | p-value  |  slope   |intercept "
        );
        assert_eq!(table_separator().len(), 55);

        let period: TimePeriod = "2015-01-01:2016-01-01".parse().unwrap();
        let diff = SummaryDiff {
            coefficient: 0.0,
            p_value: -0.123_456,
            slope: 1234.5,
            intercept: 2.0,
        };
        assert_eq!(
            table_row(&period, &diff),
            "2015-01-01_2016-01-01    |   0.0    |  -0.123  | 1.23e+03 |   2.0    "
        );
    }

    #[test]
    fn test_table_string_rows_in_order() {
        let table = table_string(&report()).unwrap();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2015-01-01_2016-01-01"));
        assert!(lines[3].starts_with("2016-01-01_2017-01-01"));
    }

    #[test]
    fn test_csv_has_line_per_outcome() {
        let csv = csv_string(&report()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("2015-01-01_2016-01-01,0,"));
        assert!(lines[2].starts_with("2015-01-01_2016-01-01,1,"));
        assert!(lines[4].starts_with("2016-01-01_2017-01-01,1,"));
        assert!(lines.iter().all(|line| line.split(',').count() == 8));
    }

    struct RejectingWriter {
        accepted: usize,
    }

    impl fmt::Write for RejectingWriter {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            if self.accepted == 0 {
                return Err(fmt::Error);
            }
            self.accepted -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_writer_errors_are_propagated() {
        let report = report();
        for accepted in [0, 3] {
            let mut w = RejectingWriter { accepted };
            assert_eq!(write_csv(&mut w, &report), Err(fmt::Error));
            let mut w = RejectingWriter { accepted };
            assert_eq!(write_table(&mut w, &report), Err(fmt::Error));
        }
    }

    #[test]
    fn test_json_records() {
        let records = records(&report());
        assert_eq!(records.len(), 2);
        let value = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(value["label"], "2015-01-01_2016-01-01");
        assert_eq!(value["period"]["start"], "2015-01-01");
        assert_eq!(value["outcomes"][1]["outcome"], 1);
        assert!(value["diff"]["slope"].is_number());
    }
}
