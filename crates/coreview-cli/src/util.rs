use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use coreview_stats::series::{CountMap, SeriesInput, SeriesPair};
use serde::Deserialize;

/// Destination for a report: stdout when no path is given.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn save_text(content: &str, output_path: Option<PathBuf>) -> anyhow::Result<()> {
        let mut output = Output::from_output_path(output_path)?;
        output
            .write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to {}", output.display_path()))?;
        output
            .flush()
            .with_context(|| format!("Failed to flush output to {}", output.display_path()))?;
        Ok(())
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Data read from a `correlate` input file.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    /// `{"<key>": <value>, ...}`
    Counts(CountMap),
    /// `{"x": [...], "y": [...]}`
    Columns(SeriesPair),
}

impl SeriesData {
    pub fn as_input(&self) -> SeriesInput<'_> {
        match self {
            SeriesData::Counts(counts) => SeriesInput::Mapping(counts),
            SeriesData::Columns(series) => SeriesInput::Series(series),
        }
    }
}

#[derive(Deserialize)]
struct Columns {
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Read either a count map or a pair of `x`/`y` columns from a JSON file
pub fn read_series_file<P>(path: P) -> anyhow::Result<SeriesData>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open series file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse series file: {}", path.display()))?;
    let data = if value.get("x").is_some() {
        let Columns { x, y } = serde_json::from_value(value)
            .with_context(|| format!("Malformed columns in {}", path.display()))?;
        let series = SeriesPair::new(x, y)
            .with_context(|| format!("Invalid columns in {}", path.display()))?;
        SeriesData::Columns(series)
    } else {
        let counts = serde_json::from_value(value)
            .with_context(|| format!("Malformed count map in {}", path.display()))?;
        SeriesData::Counts(counts)
    };
    Ok(data)
}

pub fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use coreview_stats::StatsError;

    use super::*;

    #[test]
    fn test_read_count_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.json");
        fs::write(&path, r#"{"2": 0.5, "1": 0.25}"#).unwrap();

        let data = read_series_file(&path).unwrap();
        assert_eq!(data, SeriesData::Counts(CountMap::from([(1, 0.25), (2, 0.5)])));
        assert!(matches!(data.as_input(), SeriesInput::Mapping(_)));
    }

    #[test]
    fn test_read_columns_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("columns.json");
        fs::write(&path, r#"{"x": [3, 1, 2], "y": [30.0, 10.0, 20.0]}"#).unwrap();

        let SeriesData::Columns(series) = read_series_file(&path).unwrap() else {
            panic!("expected columns");
        };
        assert_eq!(series.x(), &[3.0, 1.0, 2.0]);
        assert_eq!(series.y(), &[30.0, 10.0, 20.0]);
    }

    #[test]
    fn test_read_columns_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("columns.json");
        fs::write(&path, r#"{"x": [1, 2, 3], "y": [1.0]}"#).unwrap();

        let err = read_series_file(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StatsError>(),
            Some(&StatsError::LengthMismatch { x_len: 3, y_len: 1 })
        );
    }

    #[test]
    fn test_read_series_rejects_other_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"zero": 1.0}"#).unwrap();
        assert!(read_series_file(&path).is_err());
        assert!(read_series_file(dir.path().join("missing.json")).is_err());
    }
}
