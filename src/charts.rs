//! Off-screen chart rendering.
//!
//! Charts are drawn with ratatui into a `TestBackend` buffer and saved as a
//! text canvas, so no terminal or image library is needed.

use ratatui::{
    backend::TestBackend,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame, Terminal,
};

use crate::metrics;
use crate::model::MetricAnalysis;
use anyhow::{Context, Result};
use std::path::Path;

const HISTOGRAM_BINS: usize = 20;

/// Draw the four-panel chart for `analysis` into a `width` x `height` canvas.
pub fn render(analysis: &MetricAnalysis, width: u16, height: u16) -> Result<String> {
    let mut terminal =
        Terminal::new(TestBackend::new(width, height)).context("create off-screen terminal")?;
    terminal
        .draw(|f| draw_panels(f, analysis))
        .context("draw chart")?;
    Ok(buffer_to_text(terminal.backend().buffer()))
}

pub fn write_chart(path: &Path, analysis: &MetricAnalysis, width: u16, height: u16) -> Result<()> {
    let text = render(analysis, width, height)?;
    crate::storage::write_atomic(path, text.as_bytes())
}

fn draw_panels(f: &mut Frame, analysis: &MetricAnalysis) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(f.area());
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[1]);

    draw_over_time(f, top[0], analysis);
    draw_percentile_scatter(f, top[1], analysis);
    draw_histogram(f, bottom[0], analysis);
    draw_percentile_legend(f, bottom[1], analysis);
}

/// Value against the series' own time axis.
fn draw_over_time(f: &mut Frame, area: Rect, analysis: &MetricAnalysis) {
    let series = &analysis.series;
    let points: Vec<(f64, f64)> = series
        .timestamps
        .iter()
        .copied()
        .zip(series.values.iter().copied())
        .collect();
    let x = bounds(&series.timestamps);
    let y = bounds(&series.values);

    let dataset = Dataset::default()
        .name(analysis.metric.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} over time", analysis.metric)),
        )
        .x_axis(axis("time", x))
        .y_axis(axis(&analysis.unit, y));
    f.render_widget(chart, area);
}

/// Value against sample index, with a dashed line per requested percentile.
fn draw_percentile_scatter(f: &mut Frame, area: Rect, analysis: &MetricAnalysis) {
    let values = &analysis.series.values;
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect();
    let x = [0.0, values.len().saturating_sub(1).max(1) as f64];
    let y = bounds(values);

    let markers: Vec<Vec<(f64, f64)>> = analysis
        .stats
        .percentiles
        .iter()
        .map(|p| dashed(x, p.value))
        .collect();

    let mut datasets = vec![Dataset::default()
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Cyan))
        .data(&points)];
    for m in &markers {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Red))
                .data(m),
        );
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Percentile distribution"),
        )
        .x_axis(axis("sample", x))
        .y_axis(axis(&analysis.unit, y));
    f.render_widget(chart, area);
}

fn draw_histogram(f: &mut Frame, area: Rect, analysis: &MetricAnalysis) {
    let bins = metrics::histogram(&analysis.series.values, HISTOGRAM_BINS);
    let bars: Vec<Bar> = bins
        .iter()
        .map(|(_, count)| {
            Bar::default()
                .value(*count)
                .text_value(String::new())
                .style(Style::default().fg(Color::Green))
        })
        .collect();

    // Chart width minus borders, shared evenly between bars.
    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / bins.len().max(1)).max(1) as u16;
    let title = match (bins.first(), bins.last()) {
        (Some((lo, _)), Some(_)) => format!(
            "Histogram ({:.2} .. {:.2} {})",
            lo, analysis.stats.max, analysis.unit
        ),
        _ => "Histogram".to_string(),
    };

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(0);
    f.render_widget(chart, area);
}

fn draw_percentile_legend(f: &mut Frame, area: Rect, analysis: &MetricAnalysis) {
    let stats = &analysis.stats;
    let mut lines = vec![Line::from(vec![Span::styled(
        "Percentiles:",
        Style::default().fg(Color::Yellow),
    )])];
    for p in &stats.percentiles {
        lines.push(Line::from(format!(
            "p{}: {:.2} {}",
            p.rank, p.value, analysis.unit
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "n={}  min {:.2}  max {:.2}  mean {:.2}",
        stats.count, stats.min, stats.max, stats.mean
    )));

    let legend = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(legend, area);
}

fn axis<'a>(title: &str, range: [f64; 2]) -> Axis<'a> {
    Axis::default()
        .title(title.to_string())
        .style(Style::default().fg(Color::Gray))
        .bounds(range)
        .labels(vec![format!("{:.1}", range[0]), format!("{:.1}", range[1])])
}

/// Axis range covering `values`, widened when all values coincide.
fn bounds(values: &[f64]) -> [f64; 2] {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if lo == hi {
        return [lo - 0.5, hi + 0.5];
    }
    [lo, hi]
}

/// Points of a horizontal dashed line at `y` across `x`.
fn dashed(x: [f64; 2], y: f64) -> Vec<(f64, f64)> {
    const SEGMENTS: usize = 40;
    let step = (x[1] - x[0]) / SEGMENTS as f64;
    (0..=SEGMENTS)
        .filter(|i| i % 2 == 0)
        .map(|i| (x[0] + i as f64 * step, y))
        .collect()
}

fn buffer_to_text(buf: &Buffer) -> String {
    let width = buf.area.width.max(1) as usize;
    let mut out = String::new();
    for row in buf.content.chunks(width) {
        let line: String = row.iter().map(|cell| cell.symbol()).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
