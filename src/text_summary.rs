//! Text summary builder for CLI output.
//!
//! This module formats human-readable lines for text mode.

use crate::model::{AnalysisReport, MetricAnalysis};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary with one headline per metric.
pub(crate) fn build_text_summary(report: &AnalysisReport) -> TextSummary {
    let mut lines = vec![format!(
        "{}: {} files under {}",
        report.label,
        report.files,
        report.root.display()
    )];
    for m in &report.metrics {
        lines.push(metric_line(m));
    }
    TextSummary { lines }
}

fn metric_line(m: &MetricAnalysis) -> String {
    let s = &m.stats;
    let mut line = format!(
        "{}: n {} min {:.2} max {:.2} avg {:.2}",
        m.metric, s.count, s.min, s.max, s.mean
    );
    for p in &s.percentiles {
        line.push_str(&format!(" p{} {:.2}", p.rank, p.value));
    }
    if !m.unit.is_empty() {
        line.push_str(&format!(" ({})", m.unit));
    }
    line
}
