//! SVG drawing backend used by the web dashboard.
//!
//! Draws a grouped vertical bar chart: one group per day, one bar per
//! category within the group, y axis with five gridlines.

use std::fmt::Write;

use anyhow::Result;

use super::ChartBackend;
use crate::series::{ChartOptions, ChartSeries};
use crate::utils::text::escape_html;

const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 40.0;
const GRIDLINES: i64 = 5;

/// SVG viewport a chart is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgTarget {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgTarget {
    fn default() -> Self {
        Self {
            width: 960,
            height: 400,
        }
    }
}

/// A rendered SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgSurface {
    pub markup: String,
}

#[derive(Debug, Default)]
pub struct SvgBackend;

impl ChartBackend for SvgBackend {
    type Target = SvgTarget;
    type Surface = SvgSurface;

    fn construct(
        &mut self,
        target: &SvgTarget,
        series: &ChartSeries,
        options: &ChartOptions,
    ) -> Result<SvgSurface> {
        let mut markup = String::new();
        draw(&mut markup, target, series, options)?;
        Ok(SvgSurface { markup })
    }

    /// The surface owns only its markup.
    fn destroy(&mut self, surface: SvgSurface) {
        drop(surface);
    }
}

fn draw(
    out: &mut String,
    target: &SvgTarget,
    series: &ChartSeries,
    options: &ChartOptions,
) -> std::fmt::Result {
    let (w, h) = (f64::from(target.width), f64::from(target.height));
    let margin_top = if options.show_title || options.show_legend {
        40.0
    } else {
        16.0
    };
    let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (h - margin_top - MARGIN_BOTTOM).max(1.0);

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="activity-chart" viewBox="0 0 {} {}" width="100%" height="{}" role="img">"#,
        target.width, target.height, target.height
    )?;

    if options.show_title {
        writeln!(
            out,
            r#"<text class="chart-title" x="{:.1}" y="24" text-anchor="middle">{}</text>"#,
            w / 2.0,
            escape_html(&options.title)
        )?;
    }

    if series.is_empty() {
        writeln!(
            out,
            r#"<text class="chart-empty" x="{:.1}" y="{:.1}" text-anchor="middle">No activity</text>"#,
            w / 2.0,
            margin_top + plot_h / 2.0
        )?;
        return writeln!(out, "</svg>");
    }

    let max = series.max_value().max(1);
    let min = if options.begin_at_zero {
        0
    } else {
        series
            .datasets
            .iter()
            .flat_map(|ds| ds.values.iter().copied())
            .min()
            .unwrap_or(0)
            .clamp(0, max - 1)
    };
    let span = (max - min) as f64;
    let y_of = |v: i64| margin_top + plot_h - ((v.clamp(min, max) - min) as f64 / span) * plot_h;

    // Gridlines and y-axis labels
    for step in 0..=GRIDLINES {
        let value = min + (i128::from(max - min) * i128::from(step) / i128::from(GRIDLINES)) as i64;
        let y = y_of(value);
        writeln!(
            out,
            r##"<line class="grid" x1="{MARGIN_LEFT:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#30363d"/>"##,
            w - MARGIN_RIGHT
        )?;
        writeln!(
            out,
            r#"<text class="tick" x="{:.1}" y="{:.1}" text-anchor="end">{value}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0
        )?;
    }

    let groups = series.labels.len() as f64;
    let group_w = plot_w / groups;
    let bar_w = (group_w * 0.8) / series.datasets.len() as f64;
    let baseline = y_of(min);

    for (day, label) in series.labels.iter().enumerate() {
        let group_x = MARGIN_LEFT + group_w * day as f64 + group_w * 0.1;
        for (i, ds) in series.datasets.iter().enumerate() {
            let value = ds.values.get(day).copied().unwrap_or(0);
            let top = y_of(value);
            writeln!(
                out,
                r#"<rect x="{:.1}" y="{top:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}: {} {value}</title></rect>"#,
                group_x + bar_w * i as f64,
                bar_w.max(1.0),
                (baseline - top).max(0.0),
                escape_html(&ds.color),
                escape_html(label),
                escape_html(&ds.category),
            )?;
        }
        writeln!(
            out,
            r#"<text class="x-label" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + group_w * (day as f64 + 0.5),
            margin_top + plot_h + 18.0,
            escape_html(label)
        )?;
    }

    if options.show_legend {
        let mut x = MARGIN_LEFT;
        for ds in &series.datasets {
            writeln!(
                out,
                r#"<rect x="{x:.1}" y="8" width="12" height="12" fill="{}"/><text class="legend" x="{:.1}" y="18">{}</text>"#,
                escape_html(&ds.color),
                x + 16.0,
                escape_html(&ds.category)
            )?;
            x += 24.0 + 7.0 * ds.category.chars().count() as f64;
        }
    }

    writeln!(out, "</svg>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesDataset;

    fn sample() -> ChartSeries {
        ChartSeries {
            labels: vec!["2024-01-01".to_string(), "2024-01-02".to_string()],
            datasets: vec![
                SeriesDataset {
                    category: "Commits".to_string(),
                    color: "#EF6B6B".to_string(),
                    values: vec![3, 0],
                },
                SeriesDataset {
                    category: "Reviews".to_string(),
                    color: "#61CDBB".to_string(),
                    values: vec![0, 0],
                },
            ],
        }
    }

    fn render(series: &ChartSeries, options: &ChartOptions) -> String {
        SvgBackend
            .construct(&SvgTarget::default(), series, options)
            .unwrap()
            .markup
    }

    #[test]
    fn one_rect_per_category_per_day() {
        let svg = render(&sample(), &ChartOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains("Activity Data"));
        assert!(svg.contains(">2024-01-02</text>"));
    }

    #[test]
    fn legend_adds_swatches() {
        let mut opts = ChartOptions::default();
        opts.show_legend = true;
        let svg = render(&sample(), &opts);
        assert_eq!(svg.matches("<rect").count(), 6);
        assert!(svg.contains(r#"class="legend""#));
    }

    #[test]
    fn empty_series_has_placeholder() {
        let svg = render(&ChartSeries::default(), &ChartOptions::default());
        assert!(svg.contains("No activity"));
        assert!(!svg.contains("<rect"));
    }

    #[test]
    fn labels_are_escaped() {
        let mut series = sample();
        series.labels[0] = "<d1>".to_string();
        let svg = render(&series, &ChartOptions::default());
        assert!(svg.contains("&lt;d1&gt;"));
        assert!(!svg.contains("<d1>"));
    }

    #[test]
    fn huge_counts_render_gridlines() {
        let mut series = sample();
        series.datasets[0].values = vec![2_000_000_000_000_000_000, i64::MAX];
        let svg = render(&series, &ChartOptions::default());
        assert!(svg.contains(&format!(">{}</text>", i64::MAX)));
        assert_eq!(svg.matches(r#"class="grid""#).count(), 6);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn short_dataset_draws_zero_bars() {
        let mut series = sample();
        series.datasets[1].values.truncate(1);
        let svg = render(&series, &ChartOptions::default());
        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains("2024-01-02: Reviews 0"));
    }
}
