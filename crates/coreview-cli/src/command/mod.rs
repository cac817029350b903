use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coreview_analysis::{compare::DEFAULT_IGNORED, period::TimePeriod};
use coreview_stats::binning::{BinEdges, Binner, BoundaryPolicy};

use self::{compare::CompareArg, correlate::CorrelateArg, plot_bins::PlotBinsArg};

mod compare;
mod correlate;
mod plot_bins;

const DEFAULT_INPUT_DIR: &str = "results/monte_carlo_prob0";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compare P(0|i) and P(1|i) across time periods
    Compare(#[clap(flatten)] CompareArg),
    /// Draw the binned probabilities of each period
    PlotBins(#[clap(flatten)] PlotBinsArg),
    /// Correlate a single count map file
    Correlate(#[clap(flatten)] CorrelateArg),
}

/// Periods and the directory their probability files live in.
#[derive(Debug, Clone, Args)]
pub(crate) struct PeriodsArg {
    /// Time periods as START:END (comma-separated or repeated)
    #[arg(long = "period", required = true, value_delimiter = ',')]
    pub periods: Vec<TimePeriod>,

    /// Directory holding `{START}_{END}_prob_{0,1}.json` files
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct BinningArg {
    /// Bin lower bounds (comma-separated, strictly ascending)
    #[arg(long, value_delimiter = ',', default_values_t = [0_i64, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50])]
    pub bins: Vec<i64>,

    /// Build bins this wide from the first to the last `--bins` value instead
    #[arg(long)]
    pub bin_width: Option<i64>,

    /// Keys to leave out of every bin (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_IGNORED)]
    pub ignore_exact: Vec<i64>,

    /// Put keys on an interior edge into the upper bin only
    #[arg(long)]
    pub half_open_bins: bool,
}

impl BinningArg {
    pub fn binner(&self) -> anyhow::Result<Binner> {
        let edges = match self.bin_width {
            Some(width) => {
                let (Some(&start), Some(&end)) = (self.bins.first(), self.bins.last()) else {
                    anyhow::bail!("--bin-width needs a range from --bins");
                };
                BinEdges::fixed_width(start, end, width)?
            }
            None => BinEdges::new(self.bins.clone())?,
        };
        let policy = if self.half_open_bins {
            BoundaryPolicy::HalfOpen
        } else {
            BoundaryPolicy::InclusiveBoth
        };
        Ok(Binner::new(edges)
            .with_ignored(self.ignore_exact.iter().copied())
            .with_boundary_policy(policy))
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Compare(arg) => compare::run(&arg)?,
        Mode::PlotBins(arg) => plot_bins::run(&arg)?,
        Mode::Correlate(arg) => correlate::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_binning_defaults() {
        let args = CommandArgs::parse_from([
            "coreview",
            "compare",
            "--period",
            "2015-01-01:2016-01-01,2016-01-01:2017-01-01",
        ]);
        let Mode::Compare(arg) = args.mode else {
            panic!("expected compare");
        };
        assert_eq!(arg.periods.periods.len(), 2);
        assert_eq!(arg.periods.input_dir, PathBuf::from(DEFAULT_INPUT_DIR));

        let binner = arg.binning.binner().unwrap();
        assert_eq!(binner, Binner::default().with_ignored(DEFAULT_IGNORED));
    }

    #[test]
    fn test_binning_overrides() {
        let args = CommandArgs::parse_from([
            "coreview",
            "plot-bins",
            "--period",
            "2015-01-01:2016-01-01",
            "--output-dir",
            "media",
            "--bins",
            "0,10,20",
            "--ignore-exact",
            "3",
            "--half-open-bins",
        ]);
        let Mode::PlotBins(arg) = args.mode else {
            panic!("expected plot-bins");
        };
        let binner = arg.binning.binner().unwrap();
        assert_eq!(binner.edges().lower_bounds(), &[0, 10, 20]);
        assert!(binner.ignored().contains(&3));
        assert_eq!(binner.boundary_policy(), BoundaryPolicy::HalfOpen);
    }

    #[test]
    fn test_bin_width_spans_bins_range() {
        let parse = |width: &str| {
            let args = CommandArgs::parse_from([
                "coreview",
                "compare",
                "--period",
                "2015-01-01:2016-01-01",
                "--bins",
                "0,65",
                "--bin-width",
                width,
            ]);
            let Mode::Compare(arg) = args.mode else {
                panic!("expected compare");
            };
            arg.binning.binner()
        };
        let binner = parse("20").unwrap();
        assert_eq!(binner.edges().lower_bounds(), &[0, 20, 40, 60]);
        assert!(parse("0").is_err());
    }

    #[test]
    fn test_rejects_bad_bins() {
        let args = CommandArgs::parse_from([
            "coreview",
            "compare",
            "--period",
            "2015-01-01:2016-01-01",
            "--bins",
            "10,5",
        ]);
        let Mode::Compare(arg) = args.mode else {
            panic!("expected compare");
        };
        assert!(arg.binning.binner().is_err());
    }
}
