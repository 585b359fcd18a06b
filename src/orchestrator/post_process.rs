//! Report emission after an analysis completes.
//!
//! Writes the per-file summary tables, the charts and the optional JSON export.
//! Write failures propagate unchanged; nothing is retried.

use crate::model::{AnalysisConfig, AnalysisReport};
use crate::storage;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Paths written for one report, in write order.
#[derive(Debug, Default)]
pub(crate) struct EmittedFiles {
    pub tables: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
    pub json: Option<PathBuf>,
}

impl EmittedFiles {
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        for p in &self.tables {
            out.push(format!("Report: {}", p.display()));
        }
        for p in &self.charts {
            out.push(format!("Chart: {}", p.display()));
        }
        if let Some(p) = &self.json {
            out.push(format!("Exported JSON: {}", p.display()));
        }
        out
    }
}

pub(crate) fn emit_report(report: &AnalysisReport, cfg: &AnalysisConfig) -> Result<EmittedFiles> {
    let mut emitted = EmittedFiles::default();

    for m in &report.metrics {
        let path = storage::output_path(&cfg.out_dir, &report.label, &m.metric, "report.csv");
        storage::write_summary_table(&path, &m.per_file)
            .with_context(|| format!("failed to write {} summary table", m.metric))?;
        info!(path = %path.display(), rows = m.per_file.len(), "wrote summary table");
        emitted.tables.push(path);
    }

    if cfg.charts {
        emit_charts(report, cfg, &mut emitted)?;
    }

    if let Some(path) = cfg.export_json.as_deref() {
        storage::export_json(path, report)
            .with_context(|| format!("failed to export JSON to {}", path.display()))?;
        emitted.json = Some(path.to_path_buf());
    }

    Ok(emitted)
}

#[cfg(feature = "charts")]
fn emit_charts(report: &AnalysisReport, cfg: &AnalysisConfig, emitted: &mut EmittedFiles) -> Result<()> {
    for m in &report.metrics {
        let path = storage::output_path(&cfg.out_dir, &report.label, &m.metric, "graph.txt");
        crate::charts::write_chart(&path, m, cfg.chart_width, cfg.chart_height)
            .with_context(|| format!("failed to render {} chart", m.metric))?;
        info!(path = %path.display(), "wrote chart");
        emitted.charts.push(path);
    }
    Ok(())
}

#[cfg(not(feature = "charts"))]
fn emit_charts(_report: &AnalysisReport, _cfg: &AnalysisConfig, _emitted: &mut EmittedFiles) -> Result<()> {
    tracing::warn!("built without the `charts` feature; skipping chart rendering");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PercentileRanks;
    use crate::model::{FileOrder, FileSummary, MetricAnalysis, OrderedSeries, StatReport};

    fn report() -> AnalysisReport {
        let rows = vec![
            FileSummary {
                num: 1,
                source: "a".into(),
                samples: 2,
                max: 2.0,
                min: 1.0,
                mean: 1.5,
            },
            FileSummary {
                num: 2,
                source: "b".into(),
                samples: 1,
                max: 4.0,
                min: 4.0,
                mean: 4.0,
            },
        ];
        AnalysisReport {
            root: "logs".into(),
            label: "pg".into(),
            generated_utc: "2024-05-20T12:00:00Z".into(),
            files: 2,
            metrics: vec![MetricAnalysis {
                metric: "cpu".into(),
                unit: "%".into(),
                series: OrderedSeries {
                    values: vec![1.0, 2.0, 4.0],
                    timestamps: vec![0.0, 1.0, 2.0],
                },
                stats: StatReport {
                    count: 3,
                    max: 4.0,
                    min: 1.0,
                    mean: 7.0 / 3.0,
                    percentiles: Vec::new(),
                },
                per_file: rows,
            }],
        }
    }

    fn config(out_dir: PathBuf, charts: bool) -> AnalysisConfig {
        AnalysisConfig {
            percentiles: PercentileRanks::default(),
            export_json: Some(out_dir.join("pg.json")),
            out_dir,
            label: "pg".into(),
            order: FileOrder::Modified,
            json: false,
            charts,
            chart_width: 80,
            chart_height: 24,
        }
    }

    #[test]
    fn writes_one_table_row_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let emitted = emit_report(&report(), &config(dir.path().to_path_buf(), false)).unwrap();
        assert_eq!(emitted.tables, vec![dir.path().join("pg_cpu_report.csv")]);
        assert!(emitted.charts.is_empty());
        let table = std::fs::read_to_string(&emitted.tables[0]).unwrap();
        assert_eq!(table, "num,max,min,mean\n1,2,1,1.5\n2,4,4,4\n");
        assert!(dir.path().join("pg.json").exists());
        assert_eq!(emitted.messages().len(), 2);
    }

    #[cfg(feature = "charts")]
    #[test]
    fn writes_charts_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let emitted = emit_report(&report(), &config(dir.path().to_path_buf(), true)).unwrap();
        assert_eq!(emitted.charts, vec![dir.path().join("pg_cpu_graph.txt")]);
        assert!(emitted.charts[0].exists());
    }

    #[test]
    fn unwritable_destination_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path().join("absent"), false);
        let err = emit_report(&report(), &cfg).unwrap_err();
        assert!(format!("{err:#}").contains("cpu summary table"));
    }
}
