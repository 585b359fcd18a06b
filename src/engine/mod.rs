//! Parsers that turn one raw log file into samples.
//!
//! The corpus walker only knows about [`SampleParser`]; each log format lives
//! in its own module.

mod latency;
mod resources;
mod transactions;

pub use latency::QueryDigestExtractor;
pub use resources::DockerStatsParser;
pub use transactions::TransactionLogParser;

/// Parses the full text of one file into zero or more samples, all-or-nothing.
pub trait SampleParser {
    type Sample;
    type Error: std::error::Error + Send + Sync + 'static;

    fn parse(&self, text: &str) -> Result<Vec<Self::Sample>, Self::Error>;
}
