//! PNG bar charts of the two outcome series
//!
//! Every chart here is a grouped bar chart: one group per category, with the
//! `P(0|i)` bar next to the `P(1|i)` bar.

use std::path::Path;

use anyhow::Context;
use coreview_analysis::{compare::ComparisonReport, loader::OutcomePair, period::TimePeriod};
use coreview_stats::binning::BinnedCounts;
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (1200, 800);
const SERIES_LABELS: [&str; 2] = ["P(0|i)", "P(1|i)"];

/// Where bars sit relative to their category position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarAlign {
    /// The pair is centered on the position.
    Center,
    /// The first bar starts at the position.
    Edge,
}

#[derive(Debug, Clone)]
pub struct GroupedBars<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub positions: Vec<f64>,
    /// Tick labels per position; numeric ticks when `None`.
    pub tick_labels: Option<Vec<String>>,
    pub values: OutcomePair<Vec<f64>>,
    pub bar_width: f64,
    pub align: BarAlign,
}

impl GroupedBars<'_> {
    fn bar_spans(&self) -> impl Iterator<Item = (u8, f64, f64, f64)> + '_ {
        let start = match self.align {
            BarAlign::Center => -self.bar_width,
            BarAlign::Edge => 0.0,
        };
        self.values.iter().flat_map(move |(outcome, values)| {
            let offset = start + f64::from(outcome) * self.bar_width;
            self.positions
                .iter()
                .zip(values)
                .map(move |(&pos, &value)| {
                    let left = pos + offset;
                    (outcome, left, left + self.bar_width, value)
                })
        })
    }

    fn x_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .bar_spans()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, l, r, _)| {
                (lo.min(l), hi.max(r))
            });
        if lo.is_finite() && hi.is_finite() {
            let pad = self.bar_width;
            (lo - pad, hi + pad)
        } else {
            (0.0, 1.0)
        }
    }

    fn y_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .bar_spans()
            .fold((0.0_f64, 0.0_f64), |(lo, hi), (_, _, _, v)| {
                (lo.min(v), hi.max(v))
            });
        if hi - lo <= f64::EPSILON {
            return (0.0, 1.0);
        }
        let pad = (hi - lo) * 0.05;
        (if lo < 0.0 { lo - pad } else { lo }, hi + pad)
    }

    /// Off-category ticks stay blank.
    fn tick_label(&self, x: f64) -> String {
        let Some(labels) = &self.tick_labels else {
            return format!("{x}");
        };
        self.positions
            .iter()
            .position(|&pos| (pos - x).abs() < 1e-6)
            .and_then(|idx| labels.get(idx))
            .cloned()
            .unwrap_or_default()
    }
}

pub fn draw_grouped_bars(chart: &GroupedBars<'_>, path: &Path) -> anyhow::Result<()> {
    let err = |e: &dyn std::fmt::Display| anyhow::anyhow!("{e}");

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| err(&e))?;

    let (x_lo, x_hi) = chart.x_range();
    let (y_lo, y_hi) = chart.y_range();
    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(|e| err(&e))?;

    let formatter = |x: &f64| chart.tick_label(*x);
    let mut mesh = ctx.configure_mesh();
    mesh.x_desc(chart.x_desc)
        .y_desc(chart.y_desc)
        .label_style(("sans-serif", 20))
        .disable_x_mesh()
        .x_label_formatter(&formatter);
    if chart.tick_labels.is_some() {
        mesh.x_labels(chart.positions.len().max(1));
    }
    mesh.draw().map_err(|e| err(&e))?;

    for (outcome, label) in (0_u8..).zip(SERIES_LABELS) {
        let color = Palette99::pick(usize::from(outcome)).filled();
        ctx.draw_series(
            chart
                .bar_spans()
                .filter(|(o, ..)| *o == outcome)
                .map(|(_, left, right, value)| {
                    Rectangle::new([(left, 0.0), (right, value)], color)
                }),
        )
        .map_err(|e| err(&e))?
        .label(label)
        .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| err(&e))?;

    root.present()
        .map_err(|e| err(&e))
        .with_context(|| format!("Failed to write chart: {}", path.display()))?;
    log::info!("chart saved to {}", path.display());
    Ok(())
}

/// Bars per period, latest first, labelled `YYYY-YYYY`.
#[expect(clippy::cast_precision_loss)]
fn over_time<'a>(
    periods: &[TimePeriod],
    values: OutcomePair<Vec<f64>>,
    title: &'a str,
    y_desc: &'a str,
) -> GroupedBars<'a> {
    let reversed = |mut v: Vec<f64>| {
        v.reverse();
        v
    };
    GroupedBars {
        title,
        x_desc: "Time Period",
        y_desc,
        positions: (0..periods.len()).map(|i| i as f64).collect(),
        tick_labels: Some(periods.iter().rev().map(TimePeriod::year_label).collect()),
        values: values.map(reversed),
        bar_width: 0.4,
        align: BarAlign::Center,
    }
}

fn collect_pairs<I>(pairs: I) -> OutcomePair<Vec<f64>>
where
    I: Iterator<Item = OutcomePair<f64>>,
{
    let mut out = OutcomePair::<Vec<f64>>::default();
    for pair in pairs {
        out.prob0.push(pair.prob0);
        out.prob1.push(pair.prob1);
    }
    out
}

/// Writes `all_corr.png` and `all_lin.png` into `dir`.
pub fn draw_comparison(report: &ComparisonReport, dir: &Path) -> anyhow::Result<()> {
    let periods: Vec<_> = report.periods().iter().map(|p| p.period).collect();

    let coefficients = collect_pairs(
        report
            .correlations()
            .map(|pair| pair.map(|c| c.coefficient)),
    );
    let chart = over_time(
        &periods,
        coefficients,
        "Monte Carlo Probability Correlation",
        "Pearson Correlation Coefficient",
    );
    draw_grouped_bars(&chart, &dir.join("all_corr.png"))?;

    let slopes = collect_pairs(report.regressions().map(|pair| pair.map(|r| r.slope)));
    let chart = over_time(
        &periods,
        slopes,
        "Monte Carlo Probability Regression",
        "Line Slope",
    );
    draw_grouped_bars(&chart, &dir.join("all_lin.png"))?;

    Ok(())
}

/// `{label}_prob_01_i{ignored}.png`
#[must_use]
pub fn binned_chart_file_name(period: &TimePeriod, ignored: &[i64]) -> String {
    let ignored: String = ignored.iter().map(ToString::to_string).collect();
    format!("{}_prob_01_i{ignored}.png", period.label())
}

/// Grouped bars of both binned series of one period.
#[expect(clippy::cast_precision_loss)]
pub fn draw_binned(
    period: &TimePeriod,
    binned: &OutcomePair<BinnedCounts>,
    ignored: &[i64],
    bar_width: f64,
    path: &Path,
) -> anyhow::Result<()> {
    let ignored = ignored
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let title = format!("{}: Ignoring i=[{ignored}]", period.label());
    let chart = GroupedBars {
        title: &title,
        x_desc: "Number of i friends who reviewed same business",
        y_desc: "Monte Carlo probability",
        positions: binned.prob0.keys().map(|&k| k as f64).collect(),
        tick_labels: None,
        values: binned.as_ref().map(|b| b.values().copied().collect()),
        bar_width,
        align: BarAlign::Edge,
    };
    draw_grouped_bars(&chart, path)
}
