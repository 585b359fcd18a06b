//! Flat report files.
//!
//! Every file is staged in a temporary file next to its destination and only
//! renamed into place once fully written.

use crate::model::{AnalysisReport, FileSummary};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SUMMARY_HEADER: &str = "num,max,min,mean";

/// Write `content` to `path`, leaving no file behind if anything fails.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temporary file in {}", dir.display()))?;
    tmp.write_all(content)
        .with_context(|| format!("write {}", path.display()))?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("persist {}", path.display()))?;
    Ok(())
}

/// Render per-file rows as `num,max,min,mean` text.
pub fn summary_table(rows: &[FileSummary]) -> String {
    let mut out = String::with_capacity(16 * (rows.len() + 1));
    out.push_str(SUMMARY_HEADER);
    out.push('\n');
    for r in rows {
        out.push_str(&format!("{},{},{},{}\n", r.num, r.max, r.min, r.mean));
    }
    out
}

pub fn write_summary_table(path: &Path, rows: &[FileSummary]) -> Result<()> {
    write_atomic(path, summary_table(rows).as_bytes())
}

pub fn export_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("serialize report")?;
    write_atomic(path, &data)
}

/// `<out_dir>/<label>_<metric>_<kind>`
pub fn output_path(out_dir: &Path, label: &str, metric: &str, kind: &str) -> PathBuf {
    out_dir.join(format!("{label}_{metric}_{kind}"))
}
