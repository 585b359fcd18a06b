use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::metrics::PercentileRanks;

/// Settings for one analysis run, built from CLI arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub percentiles: PercentileRanks,
    pub out_dir: PathBuf,
    pub label: String,
    pub order: FileOrder,
    pub json: bool,
    pub export_json: Option<PathBuf>,
    pub charts: bool,
    pub chart_width: u16,
    pub chart_height: u16,
}

/// How files found under a corpus root are ordered before parsing.
///
/// Resource and transaction logs carry no per-sample timestamp, so this order
/// is the cross-file time order of their series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileOrder {
    /// Oldest modification time first, ties broken by path.
    Modified,
    /// Lexicographic path order.
    Name,
    /// Whatever order the filesystem yields.
    Walk,
}

/// Mean query latency of one benchmark run and when its capture started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    pub value_ms: f64,
    /// Seconds since the Unix epoch.
    pub captured_at: f64,
}

/// One monitoring tick of a container stats log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    /// Memory usage figure with its unit suffix stripped.
    pub memory_bytes: f64,
}

/// Samples parsed out of a single file, in file order.
#[derive(Debug, Clone)]
pub struct RunSamples<T> {
    pub source: PathBuf,
    pub samples: Vec<T>,
}

/// Every run collected under one corpus root, in walk order.
#[derive(Debug, Clone)]
pub struct SampleCorpus<T> {
    pub runs: Vec<RunSamples<T>>,
}

impl<T> Default for SampleCorpus<T> {
    fn default() -> Self {
        Self { runs: Vec::new() }
    }
}

impl<T> SampleCorpus<T> {
    /// Total number of samples across all runs.
    pub fn sample_count(&self) -> usize {
        self.runs.iter().map(|r| r.samples.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    /// Flatten into one pool, keeping run order and in-file order.
    pub fn flatten(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.runs
            .iter()
            .flat_map(|r| r.samples.iter().cloned())
            .collect()
    }
}

/// Values paired with their position on the time axis, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderedSeries {
    pub values: Vec<f64>,
    pub timestamps: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    pub rank: f64,
    pub value: f64,
}

/// Descriptive statistics over one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatReport {
    pub count: usize,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub percentiles: Vec<Percentile>,
}

#[cfg(test)]
impl StatReport {
    /// Look up the value computed for `rank`, if it was requested.
    pub fn percentile(&self, rank: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| p.rank == rank)
            .map(|p| p.value)
    }
}

/// One row of a per-file summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    /// 1-based position of the file in corpus order.
    pub num: usize,
    pub source: PathBuf,
    pub samples: usize,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

/// Everything computed for one metric of a corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricAnalysis {
    pub metric: String,
    pub unit: String,
    pub series: OrderedSeries,
    pub stats: StatReport,
    pub per_file: Vec<FileSummary>,
}

/// Result of one pipeline run over a corpus root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub root: PathBuf,
    pub label: String,
    pub generated_utc: String,
    pub files: usize,
    pub metrics: Vec<MetricAnalysis>,
}
