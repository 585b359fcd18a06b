//! End-to-end analyses: walk, parse, order, aggregate.
//!
//! Each call builds its corpus and series from scratch and hands back owned
//! results, so analyses never see each other's samples.

use super::{merge, walker};
use crate::engine::{DockerStatsParser, QueryDigestExtractor, TransactionLogParser};
use crate::metrics::{self, PercentileRanks};
use crate::model::{AnalysisConfig, AnalysisReport, FileSummary, MetricAnalysis, OrderedSeries};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

/// Query-digest reports, one mean latency per run, ordered by capture time.
pub(crate) fn analyze_latency(root: &Path, cfg: &AnalysisConfig) -> Result<AnalysisReport> {
    let corpus = walker::collect(root, &QueryDigestExtractor, cfg.order)
        .context("failed to collect query-digest reports")?;
    let per_file = per_file_rows(&corpus.runs, |s| s.value_ms)?;
    let series = merge::merge_by_time(corpus.flatten());

    let latency = metric("latency", "ms", series, per_file, &cfg.percentiles, root)?;
    build_report(root, cfg, corpus.runs.len(), vec![latency])
}

/// Container stats logs, reported as a CPU and a memory metric.
pub(crate) fn analyze_resources(root: &Path, cfg: &AnalysisConfig) -> Result<AnalysisReport> {
    let corpus = walker::collect(root, &DockerStatsParser, cfg.order)
        .context("failed to collect container stats logs")?;
    let samples = corpus.flatten();

    let cpu = metric(
        "cpu",
        "%",
        merge::in_discovery_order(samples.iter().map(|s| s.cpu_percent).collect()),
        per_file_rows(&corpus.runs, |s| s.cpu_percent)?,
        &cfg.percentiles,
        root,
    )?;
    let ram = metric(
        "ram",
        "mem",
        merge::in_discovery_order(samples.iter().map(|s| s.memory_bytes).collect()),
        per_file_rows(&corpus.runs, |s| s.memory_bytes)?,
        &cfg.percentiles,
        root,
    )?;
    build_report(root, cfg, corpus.runs.len(), vec![cpu, ram])
}

/// Transaction logs; the series holds one mean latency per file.
pub(crate) fn analyze_transactions(root: &Path, cfg: &AnalysisConfig) -> Result<AnalysisReport> {
    let corpus = walker::collect(root, &TransactionLogParser, cfg.order)
        .context("failed to collect transaction logs")?;
    let per_file = per_file_rows(&corpus.runs, |ms| *ms)?;
    let series = merge::in_discovery_order(per_file.iter().map(|row| row.mean).collect());

    let tx = metric("transactions", "ms", series, per_file, &cfg.percentiles, root)?;
    build_report(root, cfg, corpus.runs.len(), vec![tx])
}

fn per_file_rows<T>(
    runs: &[crate::model::RunSamples<T>],
    value: impl Fn(&T) -> f64,
) -> Result<Vec<FileSummary>> {
    metrics::summarize_runs(runs, value)
        .map_err(|(path, e)| anyhow!(e).context(format!("{} yielded no samples", path.display())))
}

fn metric(
    name: &str,
    unit: &str,
    series: OrderedSeries,
    per_file: Vec<FileSummary>,
    ranks: &PercentileRanks,
    root: &Path,
) -> Result<MetricAnalysis> {
    let stats = metrics::aggregate(&series.values, ranks)
        .with_context(|| format!("no {name} samples under {}", root.display()))?;
    info!(
        metric = name,
        count = stats.count,
        min = stats.min,
        max = stats.max,
        mean = stats.mean,
        "aggregated"
    );
    Ok(MetricAnalysis {
        metric: name.to_string(),
        unit: unit.to_string(),
        series,
        stats,
        per_file,
    })
}

fn build_report(
    root: &Path,
    cfg: &AnalysisConfig,
    files: usize,
    metrics: Vec<MetricAnalysis>,
) -> Result<AnalysisReport> {
    let generated_utc = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format report timestamp")?;
    Ok(AnalysisReport {
        root: root.to_path_buf(),
        label: cfg.label.clone(),
        generated_utc,
        files,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileOrder;
    use std::fs;

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            percentiles: PercentileRanks::default(),
            out_dir: ".".into(),
            label: "test".into(),
            order: FileOrder::Name,
            json: false,
            export_json: None,
            charts: false,
            chart_width: 80,
            chart_height: 24,
        }
    }

    fn digest(mean_ms: &str, start: &str) -> String {
        format!(
            "Capture start      : {start} +0000 UTC\n\n# Query 1\nQuery\nmean time       : {mean_ms}ms\n"
        )
    }

    #[test]
    fn latency_series_follows_capture_time_not_file_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.log"), digest("3.0", "2024-05-20 12:00:02.000000")).unwrap();
        fs::write(dir.path().join("2.log"), digest("1.0", "2024-05-20 12:00:00.000000")).unwrap();
        fs::write(dir.path().join("3.log"), digest("2.0", "2024-05-20 12:00:01.000000")).unwrap();

        let report = analyze_latency(dir.path(), &config()).unwrap();
        assert_eq!(report.files, 3);
        let latency = &report.metrics[0];
        assert_eq!(latency.metric, "latency");
        assert_eq!(latency.series.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(latency.stats.percentile(50.0), Some(2.0));
        // rows stay in file order
        let means: Vec<f64> = latency.per_file.iter().map(|r| r.mean).collect();
        assert_eq!(means, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn resource_rows_are_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let header = "CONTAINER ID   NAME   CPU %   MEM USAGE / LIMIT   MEM %\n";
        for (name, cpus) in [("a.log", [10.0, 20.0, 30.0]), ("b.log", [100.0, 200.0, 300.0])] {
            let mut body = header.to_string();
            for (i, cpu) in cpus.iter().enumerate() {
                body.push_str(&format!("id   db   {cpu}%   {}MiB / 2GiB   1%\n", i + 1));
            }
            fs::write(dir.path().join(name), body).unwrap();
        }

        let report = analyze_resources(dir.path(), &config()).unwrap();
        assert_eq!(report.files, 2);
        let cpu = &report.metrics[0];
        let ram = &report.metrics[1];
        assert_eq!(cpu.per_file.len(), 2);
        assert_eq!(
            (cpu.per_file[0].max, cpu.per_file[0].min, cpu.per_file[0].mean),
            (30.0, 10.0, 20.0)
        );
        assert_eq!(
            (cpu.per_file[1].max, cpu.per_file[1].min, cpu.per_file[1].mean),
            (300.0, 100.0, 200.0)
        );
        assert_eq!(ram.per_file[1].mean, 2.0);
        assert_eq!(cpu.series.values.len(), 6);
        assert_eq!(cpu.series.timestamps.last(), Some(&5.0));
        assert_eq!(cpu.stats.max, 300.0);
    }

    #[test]
    fn transaction_series_is_per_file_means() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "0 1 1000 0\n0 2 3000 0\n").unwrap();
        fs::write(dir.path().join("b"), "0 1 4000 0\n").unwrap();

        let report = analyze_transactions(dir.path(), &config()).unwrap();
        let tx = &report.metrics[0];
        assert_eq!(tx.series.values, vec![2.0, 4.0]);
        assert_eq!(tx.per_file[0].samples, 2);
        assert_eq!(tx.per_file[0].max, 3.0);
    }

    #[test]
    fn empty_corpus_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = analyze_latency(dir.path(), &config()).unwrap_err();
        assert!(err.chain().any(|c| c.is::<crate::error::EmptyInputError>()));
        assert!(format!("{err:#}").contains("no latency samples"));
    }

    #[test]
    fn header_only_file_is_named() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("idle.log"), "CONTAINER ID   NAME   CPU %\n").unwrap();
        let err = analyze_resources(dir.path(), &config()).unwrap_err();
        assert!(format!("{err:#}").contains("idle.log yielded no samples"));
    }
}
