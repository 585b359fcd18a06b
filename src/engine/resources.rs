use super::SampleParser;
use crate::error::{ParseError, ParseErrorKind};
use crate::model::ResourceSample;
use regex::Regex;
use std::sync::OnceLock;

/// Lines starting with this are the `CONTAINER ID ...` column header.
const HEADER_MARKER: &str = "CON";
const CPU_FIELD: usize = 2;
const MEM_FIELD: usize = 3;

fn column_gap_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").expect("column gap pattern is valid"))
}

/// Reads `docker stats` output appended once per monitoring tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerStatsParser;

impl SampleParser for DockerStatsParser {
    type Sample = ResourceSample;
    type Error = ParseError;

    fn parse(&self, text: &str) -> Result<Vec<ResourceSample>, ParseError> {
        parse_lines(text.lines())
    }
}

/// Parse stats lines in order, skipping header rows.
///
/// Columns are separated by two or more spaces; single spaces occur inside
/// the `MEM USAGE / LIMIT` column. Any other line, blank ones included, must
/// be a full tick or the file is rejected.
pub fn parse_lines<'a, I>(lines: I) -> Result<Vec<ResourceSample>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut samples = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        if line.starts_with(HEADER_MARKER) {
            continue;
        }
        samples.push(parse_line(idx + 1, line)?);
    }
    Ok(samples)
}

fn parse_line(line_no: usize, line: &str) -> Result<ResourceSample, ParseError> {
    let fields: Vec<&str> = column_gap_re().split(line.trim()).collect();
    if fields.len() <= MEM_FIELD {
        return Err(ParseError::new(
            line_no,
            line,
            ParseErrorKind::MissingFields {
                expected: MEM_FIELD + 1,
                found: fields.len(),
            },
        ));
    }

    let cpu_text = fields[CPU_FIELD].trim().trim_end_matches('%');
    let cpu_percent = number(line_no, line, "cpu", cpu_text)?;

    // "1.5GiB / 7.6GiB": keep the usage half and drop its unit, sign included.
    let usage = fields[MEM_FIELD].split(" / ").next().unwrap_or_default();
    let mem_text: String = usage
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let memory_bytes = number(line_no, line, "memory", &mem_text)?;

    Ok(ResourceSample {
        cpu_percent,
        memory_bytes,
    })
}

fn number(line_no: usize, line: &str, field: &'static str, text: &str) -> Result<f64, ParseError> {
    let value = text.parse::<f64>().map_err(|_| {
        ParseError::new(
            line_no,
            line,
            ParseErrorKind::NotNumeric {
                field,
                value: text.to_string(),
            },
        )
    })?;
    if !value.is_finite() {
        return Err(ParseError::new(
            line_no,
            line,
            ParseErrorKind::NotNumeric {
                field,
                value: text.to_string(),
            },
        ));
    }
    if value < 0.0 {
        return Err(ParseError::new(
            line_no,
            line,
            ParseErrorKind::Negative { field, value },
        ));
    }
    Ok(value)
}
