//! Pipeline orchestration.
//!
//! This module owns the stages between raw files and report files: walking a
//! corpus, ordering the pooled samples, running the per-corpus analyses and
//! emitting their tables and charts. The CLI layer only picks the analysis.

pub(crate) mod merge;
mod pipeline;
mod post_process;
pub(crate) mod walker;

pub(crate) use pipeline::{analyze_latency, analyze_resources, analyze_transactions};
pub(crate) use post_process::emit_report;
