use super::SampleParser;
use crate::error::ExtractionError;
use crate::model::LatencySample;
use regex::Regex;
use std::sync::OnceLock;
use time::macros::format_description;
use time::{PrimitiveDateTime, UtcOffset};

const QUERY_HEADING: &str = "Query";
const EXCERPT_LEN: usize = 80;

fn mean_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"mean time\s*:\s*(\d+(?:\.\d+)?)ms").expect("mean time pattern is valid")
    })
}

fn capture_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"Capture start\s*:\s*(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d+) ([+-]\d{4}) UTC",
        )
        .expect("capture start pattern is valid")
    })
}

/// Reads query-digest reports, one run per file.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryDigestExtractor;

impl SampleParser for QueryDigestExtractor {
    type Sample = LatencySample;
    type Error = ExtractionError;

    fn parse(&self, text: &str) -> Result<Vec<LatencySample>, ExtractionError> {
        extract(text).map(|s| vec![s])
    }
}

/// Pull the mean query time and the capture start out of one report.
///
/// The mean time is taken from the per-query sections (everything after the
/// first `Query` heading) when the report has them, so a global summary
/// printed above them is never picked up.
pub fn extract(raw: &str) -> Result<LatencySample, ExtractionError> {
    let query_part = raw
        .find(QUERY_HEADING)
        .map(|at| &raw[at + QUERY_HEADING.len()..])
        .unwrap_or(raw);

    let mean = mean_time_re()
        .captures(query_part)
        .and_then(|c| c.get(1))
        .ok_or_else(|| missing("mean time", raw))?
        .as_str();
    let value_ms = mean
        .parse::<f64>()
        .map_err(|source| ExtractionError::InvalidNumber {
            field: "mean time",
            fragment: mean.to_string(),
            source,
        })?;

    let caps = capture_start_re()
        .captures(raw)
        .ok_or_else(|| missing("Capture start", raw))?;
    let captured_at = epoch_seconds(&caps[1], &caps[2])?;

    Ok(LatencySample {
        value_ms,
        captured_at,
    })
}

/// Convert `YYYY-MM-DD HH:MM:SS.ffffff` plus a `+HHMM` offset to Unix seconds.
fn epoch_seconds(stamp: &str, offset: &str) -> Result<f64, ExtractionError> {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");
    let local =
        PrimitiveDateTime::parse(stamp, &fmt).map_err(|source| ExtractionError::InvalidTimestamp {
            fragment: stamp.to_string(),
            source,
        })?;

    // The pattern guarantees a sign followed by four ASCII digits.
    let sign: i8 = if offset.starts_with('-') { -1 } else { 1 };
    let hours: i8 = offset[1..3].parse().unwrap_or(0);
    let minutes: i8 = offset[3..5].parse().unwrap_or(0);
    let offset = UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|source| {
        ExtractionError::InvalidOffset {
            fragment: offset.to_string(),
            source,
        }
    })?;

    let at = local.assume_offset(offset);
    Ok(at.unix_timestamp() as f64 + f64::from(at.nanosecond()) / 1e9)
}

fn missing(field: &'static str, raw: &str) -> ExtractionError {
    ExtractionError::MissingField {
        field,
        excerpt: raw.chars().take(EXCERPT_LEN).collect(),
    }
}
