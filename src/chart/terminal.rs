//! Terminal drawing backend.
//!
//! Draws one stacked horizontal bar per day. Each category gets a segment
//! sized by its share of the day's total, painted in its fill color (or a
//! distinct glyph when color is off):
//!
//! ```text
//! Activity Data
//! 2024-05-01 │██████▓▓▓▓▒▒          12
//! 2024-05-02 │███                    3
//!            └──────────────────── 0..12
//! ```

use anyhow::Result;
use colored::Colorize;

use super::ChartBackend;
use crate::series::{ChartOptions, ChartSeries};
use crate::utils::color;

/// Terminal region a chart is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalTarget {
    /// Columns available for the longest bar.
    pub bar_width: usize,
    /// Paint segments with category colors instead of glyphs.
    pub color: bool,
}

impl Default for TerminalTarget {
    fn default() -> Self {
        Self {
            bar_width: 48,
            color: true,
        }
    }
}

/// A rendered terminal chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSurface {
    pub lines: Vec<String>,
}

impl TerminalSurface {
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Renders [`ChartSeries`] as text. Holds no drawing state of its own.
#[derive(Debug, Default)]
pub struct TerminalBackend;

impl ChartBackend for TerminalBackend {
    type Target = TerminalTarget;
    type Surface = TerminalSurface;

    fn construct(
        &mut self,
        target: &TerminalTarget,
        series: &ChartSeries,
        options: &ChartOptions,
    ) -> Result<TerminalSurface> {
        Ok(TerminalSurface {
            lines: draw(target, series, options),
        })
    }

    /// The surface owns only its text lines.
    fn destroy(&mut self, surface: TerminalSurface) {
        drop(surface);
    }
}

fn draw(target: &TerminalTarget, series: &ChartSeries, options: &ChartOptions) -> Vec<String> {
    let mut lines = Vec::new();

    if options.show_title {
        lines.push(options.title.bold().to_string());
    }

    if series.is_empty() {
        lines.push("(no activity)".dimmed().to_string());
        return lines;
    }

    let totals = series.day_totals();
    let max = totals.iter().copied().max().unwrap_or(0).max(0);
    let floor = if options.begin_at_zero {
        0
    } else {
        totals.iter().copied().min().unwrap_or(0).clamp(0, max)
    };
    let span = (max - floor).max(1);

    let label_width = series
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let width = target.bar_width.max(1);

    for (day, label) in series.labels.iter().enumerate() {
        let total = totals[day];
        let bar_len = scale(total.saturating_sub(floor), span, width);
        let bar = stacked_bar(target, series, day, bar_len);
        let pad = " ".repeat(width - bar_len);
        lines.push(format!("{label:<label_width$} │{bar}{pad} {total:>4}"));
    }

    lines.push(format!(
        "{:<label_width$} └{} {}..{}",
        "",
        "─".repeat(width),
        floor,
        max
    ));

    if options.show_legend {
        lines.push(legend(target, series));
    }

    lines
}

/// Columns for `value` out of `span`, rounded up and capped at `width`.
fn scale(value: i64, span: i64, width: usize) -> usize {
    if value <= 0 {
        return 0;
    }
    let cols = (value as f64 * width as f64 / span.max(1) as f64).ceil();
    (cols as usize).min(width)
}

/// Split `bar_len` columns between the day's categories by cumulative
/// rounding so the segments always add up to the bar.
fn stacked_bar(target: &TerminalTarget, series: &ChartSeries, day: usize, bar_len: usize) -> String {
    let values: Vec<f64> = series
        .datasets
        .iter()
        .map(|ds| ds.values.get(day).copied().unwrap_or(0).max(0) as f64)
        .collect();
    let sum: f64 = values.iter().sum();
    if sum == 0.0 || bar_len == 0 {
        return String::new();
    }

    let mut bar = String::new();
    let mut cumulative = 0.0;
    let mut drawn = 0usize;
    for (i, value) in values.iter().enumerate() {
        cumulative += value;
        let end = ((cumulative / sum) * bar_len as f64).round() as usize;
        let len = end.saturating_sub(drawn);
        drawn = end.max(drawn);
        if len == 0 {
            continue;
        }
        bar.push_str(&segment(target, &series.datasets[i].color, i, len));
    }
    bar
}

fn segment(target: &TerminalTarget, token: &str, index: usize, len: usize) -> String {
    if target.color && color::parse_hex(token).is_some() {
        color::paint(&"█".repeat(len), token).to_string()
    } else {
        color::glyph(index).to_string().repeat(len)
    }
}

fn legend(target: &TerminalTarget, series: &ChartSeries) -> String {
    series
        .datasets
        .iter()
        .enumerate()
        .map(|(i, ds)| format!("{} {}", segment(target, &ds.color, i, 2), ds.category))
        .collect::<Vec<_>>()
        .join("  ")
}
