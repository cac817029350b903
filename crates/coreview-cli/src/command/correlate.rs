use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use coreview_stats::{
    correlation::{Alternative, Correlation, DEFAULT_CUTOFF, pearson},
    regression::{LinearRegression, linear_regression},
};

use crate::util::{self, SeriesData};

#[derive(Debug, Clone, Args)]
pub(crate) struct CorrelateArg {
    /// JSON file holding a count map or `{"x": [...], "y": [...]}` columns
    pub file: PathBuf,

    /// Alternative hypothesis: less, greater or two-sided
    #[arg(long, default_value_t = Alternative::Less)]
    pub alternative: Alternative,

    /// Count map keys above this value are left out of the correlation
    #[arg(long, default_value_t = DEFAULT_CUTOFF)]
    pub cutoff: i64,

    /// Also print a confidence interval for the coefficient at this level
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Evaluate the fitted line at these x values (comma-separated)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub predict: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct Analysis {
    correlation: Correlation,
    regression: LinearRegression,
    predictions: Vec<(f64, f64)>,
}

fn analyze(data: &SeriesData, arg: &CorrelateArg) -> anyhow::Result<Analysis> {
    let correlation = pearson(data.as_input(), arg.alternative, arg.cutoff)
        .with_context(|| format!("Failed to correlate {}", arg.file.display()))?;
    let regression = linear_regression(data.as_input())
        .with_context(|| format!("Failed to fit {}", arg.file.display()))?;
    let predictions = arg
        .predict
        .iter()
        .map(|&x| (x, regression.predict(x)))
        .collect();
    Ok(Analysis {
        correlation,
        regression,
        predictions,
    })
}

pub(crate) fn run(arg: &CorrelateArg) -> anyhow::Result<()> {
    let data = util::read_series_file(&arg.file)?;
    log::info!("series read from {}", arg.file.display());
    let Analysis {
        correlation: corr,
        regression: fit,
        predictions,
    } = analyze(&data, arg)?;

    match data {
        SeriesData::Counts(_) => println!(
            "Pearson correlation (n={}, keys <= {}, alternative: {})",
            corr.n, arg.cutoff, corr.alternative
        ),
        SeriesData::Columns(_) => println!(
            "Pearson correlation (n={}, alternative: {})",
            corr.n, corr.alternative
        ),
    }
    println!("  coefficient: {:>12.6}", corr.coefficient);
    println!("  p-value:     {:>12.6}", corr.p_value);
    if let Some(level) = arg.confidence {
        let (low, high) = corr.confidence_interval(level)?;
        println!("  {:>4.1}% CI:   [{low:.6}, {high:.6}]", level * 100.0);
    }

    println!();
    println!("Linear regression (all observations)");
    println!("  slope:       {:>12.6}", fit.slope);
    println!("  intercept:   {:>12.6}", fit.intercept);
    println!("  r-value:     {:>12.6}", fit.r_value);
    println!("  p-value:     {:>12.6}", fit.p_value);
    println!("  std err:     {:>12.6}", fit.std_err);
    for (x, y) in predictions {
        println!("  y({x}) = {y:.6}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use coreview_stats::series::{CountMap, SeriesPair};

    use super::*;
    use crate::command::{CommandArgs, Mode};

    fn parse(args: &[&str]) -> CorrelateArg {
        let args = CommandArgs::parse_from(["coreview", "correlate"].iter().chain(args).copied());
        let Mode::Correlate(arg) = args.mode else {
            panic!("expected correlate");
        };
        arg
    }

    #[test]
    fn test_predict_values_parsed() {
        let arg = parse(&["counts.json", "--predict", "-1,0.5,10"]);
        assert_eq!(arg.predict, vec![-1.0, 0.5, 10.0]);
        assert_eq!(arg.alternative, Alternative::Less);
        assert!(parse(&["counts.json"]).predict.is_empty());
    }

    #[test]
    fn test_predictions_follow_fitted_line() {
        let counts: CountMap = (0..10_i32)
            .map(|k| (i64::from(k), 3.0 * f64::from(k) + 1.0))
            .collect();
        let arg = parse(&["counts.json", "--predict", "-2,20"]);
        let analysis = analyze(&SeriesData::Counts(counts), &arg).unwrap();

        assert!((analysis.regression.slope - 3.0).abs() < 1e-9);
        let [(x0, y0), (x1, y1)] = analysis.predictions[..] else {
            panic!("expected two predictions");
        };
        assert_eq!((x0, x1), (-2.0, 20.0));
        assert!((y0 + 5.0).abs() < 1e-9);
        assert!((y1 - 61.0).abs() < 1e-9);
    }

    #[test]
    fn test_columns_ignore_cutoff() {
        let x = vec![500.0, 1.0, 2.0, 3.0];
        let y = vec![4.0, 1.0, 2.0, 3.0];
        let series = SeriesPair::new(x, y).unwrap();
        let arg = parse(&["columns.json", "--cutoff", "10"]);
        let analysis = analyze(&SeriesData::Columns(series), &arg).unwrap();
        assert_eq!(analysis.correlation.n, 4);
    }
}
