use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use coreview_analysis::loader::{JsonProbabilityStore, ProbabilityLoader as _};

use crate::{
    command::{BinningArg, PeriodsArg},
    plot, util,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct PlotBinsArg {
    #[clap(flatten)]
    pub periods: PeriodsArg,

    #[clap(flatten)]
    pub binning: BinningArg,

    /// Directory for the per-period PNG files
    #[arg(long)]
    pub output_dir: PathBuf,
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn run(arg: &PlotBinsArg) -> anyhow::Result<()> {
    let binner = arg.binning.binner()?;
    let store = JsonProbabilityStore::new(&arg.periods.input_dir);
    util::ensure_dir(&arg.output_dir)?;

    // Two bars share the narrowest bin
    let bar_width = binner
        .edges()
        .min_width()
        .map_or(1.0, |width| width as f64 / 2.0);

    for period in &arg.periods.periods {
        let data = store
            .load(period)
            .with_context(|| format!("Failed to load probabilities for {period}"))?;
        let binned = data.map(|counts| binner.bin(&counts));
        let path = arg.output_dir.join(plot::binned_chart_file_name(
            period,
            &arg.binning.ignore_exact,
        ));
        plot::draw_binned(
            period,
            &binned,
            &arg.binning.ignore_exact,
            bar_width,
            &path,
        )?;
        println!("{period}: saved {}", path.display());
    }

    Ok(())
}
