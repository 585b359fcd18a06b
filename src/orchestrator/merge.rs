//! Builds ordered series out of unordered sample pools.

use crate::model::{LatencySample, OrderedSeries};

/// Order latency samples from many runs by capture time.
///
/// The sort is stable, so runs captured at the same instant keep the order in
/// which they were collected.
pub fn merge_by_time(mut samples: Vec<LatencySample>) -> OrderedSeries {
    samples.sort_by(|a, b| a.captured_at.total_cmp(&b.captured_at));
    let (values, timestamps) = samples
        .into_iter()
        .map(|s| (s.value_ms, s.captured_at))
        .unzip();
    OrderedSeries { values, timestamps }
}

/// Series for samples without timestamps: discovery order, indexed from 0.
pub fn in_discovery_order(values: Vec<f64>) -> OrderedSeries {
    let timestamps = (0..values.len()).map(|i| i as f64).collect();
    OrderedSeries { values, timestamps }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(value_ms: f64, captured_at: f64) -> LatencySample {
        LatencySample {
            value_ms,
            captured_at,
        }
    }

    #[test]
    fn ties_keep_collection_order() {
        let merged = merge_by_time(vec![sample(5.0, 2.0), sample(7.0, 1.0), sample(9.0, 1.0)]);
        assert_eq!(merged.values, vec![7.0, 9.0, 5.0]);
        assert_eq!(merged.timestamps, vec![1.0, 1.0, 2.0]);
    }

    #[test]
    fn empty_pool_gives_empty_series() {
        let merged = merge_by_time(Vec::new());
        assert!(merged.values.is_empty());
        assert!(merged.timestamps.is_empty());
    }

    #[test]
    fn discovery_order_uses_index_axis() {
        let series = in_discovery_order(vec![3.0, 1.0, 2.0]);
        assert_eq!(series.values, vec![3.0, 1.0, 2.0]);
        assert_eq!(series.timestamps, vec![0.0, 1.0, 2.0]);
    }
}
