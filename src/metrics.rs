use crate::error::{EmptyInputError, InvalidRankError};
use crate::model::{FileSummary, Percentile, RunSamples, StatReport};
use serde::{Deserialize, Serialize};

/// Percentile ranks reported when none are given on the command line.
pub const DEFAULT_RANKS: [f64; 5] = [50.0, 75.0, 90.0, 95.0, 99.0];

/// Requested percentile ranks, each a finite value in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PercentileRanks(Vec<f64>);

impl PercentileRanks {
    pub fn new(ranks: Vec<f64>) -> Result<Self, InvalidRankError> {
        if let Some(bad) = ranks
            .iter()
            .copied()
            .find(|r| !r.is_finite() || !(0.0..=100.0).contains(r))
        {
            return Err(InvalidRankError(bad));
        }
        Ok(Self(ranks))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Default for PercentileRanks {
    fn default() -> Self {
        Self(DEFAULT_RANKS.to_vec())
    }
}

impl TryFrom<Vec<f64>> for PercentileRanks {
    type Error = InvalidRankError;

    fn try_from(ranks: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(ranks)
    }
}

impl From<PercentileRanks> for Vec<f64> {
    fn from(ranks: PercentileRanks) -> Self {
        ranks.0
    }
}

/// Compute max, min, mean and the requested percentiles of `series`.
///
/// Percentiles interpolate linearly between the two closest ranks, the same
/// way numpy's default `percentile` method does.
pub fn aggregate(series: &[f64], ranks: &PercentileRanks) -> Result<StatReport, EmptyInputError> {
    if series.is_empty() {
        return Err(EmptyInputError);
    }
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let mean = series.iter().sum::<f64>() / n as f64;

    let percentiles = ranks
        .as_slice()
        .iter()
        .map(|&rank| Percentile {
            rank,
            value: interpolate(&sorted, rank),
        })
        .collect();

    Ok(StatReport {
        count: n,
        max: sorted[n - 1],
        min: sorted[0],
        mean,
        percentiles,
    })
}

/// Linear-interpolated percentile on a non-empty, ascending slice.
fn interpolate(sorted: &[f64], rank: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * rank / 100.0;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Max, min and mean of every run, each computed only from that run's own
/// samples. Fails on the first run that yielded nothing.
pub fn summarize_runs<T>(
    runs: &[RunSamples<T>],
    value: impl Fn(&T) -> f64,
) -> Result<Vec<FileSummary>, (std::path::PathBuf, EmptyInputError)> {
    runs.iter()
        .enumerate()
        .map(|(i, run)| {
            let values: Vec<f64> = run.samples.iter().map(&value).collect();
            let stats = aggregate(&values, &PercentileRanks(Vec::new()))
                .map_err(|e| (run.source.clone(), e))?;
            Ok(FileSummary {
                num: i + 1,
                source: run.source.clone(),
                samples: stats.count,
                max: stats.max,
                min: stats.min,
                mean: stats.mean,
            })
        })
        .collect()
}

/// Equal-width histogram over `[min, max]` of `values`.
///
/// Returns `(lower_edge, count)` per bin. A zero-width range is widened by
/// half a unit on each side.
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, u64)> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0u64; bins];
    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (lo + i as f64 * width, c))
        .collect()
}
