//! Period comparison command
//!
//! Prints the `P(0|i) - P(1|i)` table while the periods are processed, then
//! optionally writes CSV, JSON and the two summary charts.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use coreview_analysis::{
    compare::{self, CompareConfig, ComparisonReport},
    loader::JsonProbabilityStore,
    report,
};
use coreview_stats::correlation::{Alternative, DEFAULT_CUTOFF};

use crate::{
    command::{BinningArg, PeriodsArg},
    plot,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    #[clap(flatten)]
    pub periods: PeriodsArg,

    #[clap(flatten)]
    pub binning: BinningArg,

    /// Alternative hypothesis for the correlation p-values
    #[arg(long, default_value_t = Alternative::TwoSided)]
    pub alternative: Alternative,

    /// Largest bin kept when correlating
    #[arg(long, default_value_t = DEFAULT_CUTOFF)]
    pub cutoff: i64,

    /// Directory for all_corr.png and all_lin.png; charts are skipped without it
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write per-outcome statistics as CSV to this path
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write per-period records as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    let config = CompareConfig {
        binner: arg.binning.binner()?,
        alternative: arg.alternative,
        cutoff: arg.cutoff,
    };
    let store = JsonProbabilityStore::new(&arg.periods.input_dir);
    log::info!(
        "comparing {} periods from {}",
        arg.periods.periods.len(),
        store.dir().display()
    );

    println!("{}", report::table_header());
    println!("{}", report::table_separator());
    let mut comparisons = Vec::with_capacity(arg.periods.periods.len());
    for comparison in compare::comparisons(arg.periods.periods.iter().copied(), &config, &store) {
        let comparison = comparison.context("Failed to compare periods")?;
        println!("{}", report::table_row(&comparison.period, &comparison.diff()));
        comparisons.push(comparison);
    }
    let results: ComparisonReport = comparisons.into_iter().collect();

    if let Some(path) = &arg.csv {
        let csv = report::csv_string(&results).context("Failed to format CSV")?;
        Output::save_text(&csv, Some(path.clone()))?;
        println!("\nCSV saved to: {}", path.display());
    }
    if let Some(path) = &arg.json {
        Output::save_json(&report::records(&results), Some(path.clone()))?;
        println!("\nJSON saved to: {}", path.display());
    }

    match &arg.output_dir {
        Some(dir) => {
            util::ensure_dir(dir)?;
            plot::draw_comparison(&results, dir)?;
        }
        None => log::info!("no --output-dir given, skipping charts"),
    }

    Ok(())
}
