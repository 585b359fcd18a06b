use super::SampleParser;
use crate::error::{ParseError, ParseErrorKind};

const LATENCY_FIELD: usize = 2;
const US_PER_MS: f64 = 1000.0;

/// Reads per-transaction logs (`client_id transaction_no time_us ...`), as
/// written by pgbench with `--log`. Each sample is one transaction latency in
/// milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionLogParser;

impl SampleParser for TransactionLogParser {
    type Sample = f64;
    type Error = ParseError;

    fn parse(&self, text: &str) -> Result<Vec<f64>, ParseError> {
        text.lines()
            .enumerate()
            .map(|(idx, line)| parse_line(idx + 1, line))
            .collect()
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<f64, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let Some(raw) = fields.get(LATENCY_FIELD) else {
        return Err(ParseError::new(
            line_no,
            line,
            ParseErrorKind::MissingFields {
                expected: LATENCY_FIELD + 1,
                found: fields.len(),
            },
        ));
    };
    let us = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ParseError::new(
                line_no,
                line,
                ParseErrorKind::NotNumeric {
                    field: "latency",
                    value: raw.to_string(),
                },
            )
        })?;
    if us < 0.0 {
        return Err(ParseError::new(
            line_no,
            line,
            ParseErrorKind::Negative {
                field: "latency",
                value: us,
            },
        ));
    }
    Ok(us / US_PER_MS)
}
