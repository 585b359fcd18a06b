use crate::metrics::{PercentileRanks, DEFAULT_RANKS};
use crate::model::{AnalysisConfig, AnalysisReport, FileOrder};
use crate::orchestrator;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "telemetry-digest",
    version,
    about = "Percentile reports and charts from benchmark latency and resource logs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Percentile ranks to report, comma separated, each in [0, 100]
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        num_args = 0..=1,
        value_parser = parse_rank,
        default_values_t = DEFAULT_RANKS.to_vec()
    )]
    pub percentiles: Vec<f64>,

    /// Directory that receives report tables and charts
    #[arg(long, global = true, default_value = ".")]
    pub out_dir: PathBuf,

    /// Prefix for output file names (defaults to the corpus directory name)
    #[arg(long, global = true)]
    pub label: Option<String>,

    /// Order in which files are read; also the time order of untimestamped series
    #[arg(long, global = true, value_enum, default_value_t = FileOrder::Modified)]
    pub order: FileOrder,

    /// Print the full report as JSON instead of the text summary
    #[arg(long, global = true)]
    pub json: bool,

    /// Also write the full report as JSON to this file
    #[arg(long, global = true)]
    pub export_json: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long, global = true)]
    pub no_charts: bool,

    /// Chart canvas width in cells
    #[arg(long, global = true, default_value_t = 120, value_parser = clap::value_parser!(u16).range(20..))]
    pub chart_width: u16,

    /// Chart canvas height in cells
    #[arg(long, global = true, default_value_t = 40, value_parser = clap::value_parser!(u16).range(10..))]
    pub chart_height: u16,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Query-digest reports, one benchmark run per file, merged by capture time
    Latency {
        /// Directory holding the reports
        dir: PathBuf,
    },
    /// `docker stats` logs; reports CPU and memory usage
    Resources {
        /// Directory holding the stats logs
        dir: PathBuf,
    },
    /// Per-transaction latency logs (pgbench `--log` format)
    Transactions {
        /// Directory holding the transaction logs
        dir: PathBuf,
    },
}

impl Command {
    pub fn dir(&self) -> &Path {
        match self {
            Command::Latency { dir } | Command::Resources { dir } | Command::Transactions { dir } => {
                dir
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Latency { .. } => "latency",
            Command::Resources { .. } => "resources",
            Command::Transactions { .. } => "transactions",
        }
    }
}

fn parse_rank(s: &str) -> Result<f64, String> {
    let rank: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if !(0.0..=100.0).contains(&rank) {
        return Err(format!("{rank} is outside [0, 100]"));
    }
    Ok(rank)
}

/// Build an `AnalysisConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<AnalysisConfig> {
    let percentiles =
        PercentileRanks::new(args.percentiles.clone()).context("invalid --percentiles")?;
    let label = args
        .label
        .clone()
        .unwrap_or_else(|| default_label(args.command.dir(), args.command.name()));
    Ok(AnalysisConfig {
        percentiles,
        out_dir: args.out_dir.clone(),
        label,
        order: args.order,
        json: args.json,
        export_json: args.export_json.clone(),
        charts: !args.no_charts,
        chart_width: args.chart_width,
        chart_height: args.chart_height,
    })
}

/// Name of the corpus directory, or the command name for paths like `.`.
fn default_label(dir: &Path, fallback: &str) -> String {
    dir.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

pub fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;
    let dir = args.command.dir();

    let report = match &args.command {
        Command::Latency { .. } => orchestrator::analyze_latency(dir, &cfg),
        Command::Resources { .. } => orchestrator::analyze_resources(dir, &cfg),
        Command::Transactions { .. } => orchestrator::analyze_transactions(dir, &cfg),
    }
    .with_context(|| format!("{} analysis of {} failed", args.command.name(), dir.display()))?;

    std::fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("create output directory {}", cfg.out_dir.display()))?;
    let emitted = orchestrator::emit_report(&report, &cfg)?;

    print_report(&report, &cfg)?;
    for msg in emitted.messages() {
        info!("{msg}");
    }
    Ok(())
}

fn print_report(report: &AnalysisReport, cfg: &AnalysisConfig) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = std::io::LineWriter::new(stdout.lock());
    if cfg.json {
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
    } else {
        for line in crate::text_summary::build_text_summary(report).lines {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsString;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Cli::try_parse_from(["telemetry-digest", "latency", "runs/mysql"]).unwrap();
        let cfg = build_config(&args).unwrap();
        assert_eq!(cfg.percentiles.as_slice(), &DEFAULT_RANKS);
        assert_eq!(cfg.label, "mysql");
        assert_eq!(cfg.order, FileOrder::Modified);
        assert_eq!(cfg.out_dir, PathBuf::from("."));
        assert!(cfg.charts);
        assert!(!cfg.json);
    }

    #[test]
    fn options_after_subcommand() {
        let args = Cli::try_parse_from([
            "telemetry-digest",
            "resources",
            "stats",
            "--percentiles",
            "50,99.9",
            "--order",
            "name",
            "--label",
            "pg",
            "--no-charts",
        ])
        .unwrap();
        let cfg = build_config(&args).unwrap();
        assert_eq!(cfg.percentiles.as_slice(), &[50.0, 99.9]);
        assert_eq!(cfg.order, FileOrder::Name);
        assert_eq!(cfg.label, "pg");
        assert!(!cfg.charts);
        assert!(matches!(args.command, Command::Resources { .. }));
    }

    #[test]
    fn percentiles_before_subcommand() {
        let args =
            Cli::try_parse_from(["telemetry-digest", "--percentiles", "50", "latency", "d"]).unwrap();
        assert_eq!(build_config(&args).unwrap().percentiles.as_slice(), &[50.0]);
        assert!(matches!(args.command, Command::Latency { .. }));
    }

    #[test]
    fn rejects_rank_above_hundred() {
        let res = Cli::try_parse_from(["telemetry-digest", "latency", "d", "--percentiles", "50,150"]);
        assert!(res.is_err());
    }

    #[test]
    fn label_falls_back_to_command_name() {
        let args = Cli::try_parse_from(["telemetry-digest", "transactions", "."]).unwrap();
        assert_eq!(build_config(&args).unwrap().label, "transactions");
    }

    #[test]
    fn end_to_end_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("pg");
        std::fs::create_dir(&logs).unwrap();
        std::fs::write(logs.join("run1"), "0 1 1000 0\n0 2 2000 0\n").unwrap();
        let out = dir.path().join("out");

        let args = Cli::try_parse_from([
            OsString::from("telemetry-digest"),
            OsString::from("transactions"),
            logs.clone().into_os_string(),
            OsString::from("--out-dir"),
            out.clone().into_os_string(),
            OsString::from("--no-charts"),
        ])
        .unwrap();
        run(args).unwrap();

        let table = std::fs::read_to_string(out.join("pg_transactions_report.csv")).unwrap();
        assert_eq!(table, "num,max,min,mean\n1,2,1,1.5\n");
    }

    #[test]
    fn failed_analysis_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("bad");
        std::fs::create_dir(&logs).unwrap();
        std::fs::write(logs.join("run1"), "0 1 1000 0\n0 2\n").unwrap();
        let out = dir.path().join("out");

        let args = Cli::try_parse_from([
            OsString::from("telemetry-digest"),
            OsString::from("transactions"),
            logs.clone().into_os_string(),
            OsString::from("--out-dir"),
            out.clone().into_os_string(),
        ])
        .unwrap();
        let err = run(args).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("run1"), "{msg}");
        assert!(msg.contains("line 2"), "{msg}");
        assert!(!out.exists());
    }
}
