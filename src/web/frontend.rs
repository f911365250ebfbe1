//! Server-rendered HTML for the worklog dashboard.
//!
//! The page is rebuilt on every `GET /`. Interaction is plain links
//! (`/toggle`, `/chart`) that redirect back here, so no script is needed.
//! Styles are compiled into the binary; there are no external assets.

use std::fmt::Write;

use crate::accordion::AccordionState;
use crate::grouping::group_days;
use crate::schema::{ActivityCategory, AuthorRow, DayRecord, WorklogDataset};
use crate::summary::{SummaryTable, build_summary};
use crate::utils::text::{escape_html, format_number, slug};

use super::Dashboard;

const STYLE: &str = r#"
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --yellow: #d29922;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}
a { color: var(--accent); text-decoration: none; }

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: baseline;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  margin-bottom: 24px;
}
.card h2 { font-size: 15px; margin-bottom: 12px; }
.notice { color: var(--yellow); }
.muted { color: var(--text-muted); }

table { width: 100%; border-collapse: collapse; }
th, td { padding: 6px 10px; text-align: right; border-bottom: 1px solid var(--border); }
th:first-child, td:first-child { text-align: left; }
td.absent { color: var(--text-muted); }

.legend { display: flex; gap: 16px; margin-top: 8px; }
.swatch { display: inline-block; width: 10px; height: 10px; border-radius: 2px; margin-right: 6px; }

.author { border-top: 1px solid var(--border); }
.author > a { display: block; padding: 8px 0; color: var(--text); font-weight: 500; }
.author .marker { display: inline-block; width: 16px; color: var(--text-muted); }
.day-row { display: flex; gap: 16px; margin: 8px 0 8px 16px; }
.day { flex: 1; background: var(--bg); border-radius: 6px; padding: 8px; }
.day h3 { font-size: 13px; margin-bottom: 4px; }
.day ul { list-style: none; font-size: 12px; }
"#;

/// The whole dashboard page.
pub fn page(dashboard: &Dashboard) -> String {
    let mut body = String::new();

    match dashboard.state.dataset() {
        None => {
            body.push_str(r#"<section class="card"><p class="notice">No data yet.</p>"#);
            if let Some(err) = dashboard.state.last_error() {
                let _ = write!(body, r#"<p class="muted">{}</p>"#, escape_html(err));
            }
            body.push_str("</section>");
        }
        Some(dataset) => {
            summary_section(&mut body, &build_summary(dataset));
            chart_section(&mut body, dashboard, dataset);
            accordion_section(
                &mut body,
                dataset,
                &dashboard.accordion,
                dashboard.config.display.chunk_size,
            );
        }
    }

    let fetched = dashboard
        .state
        .fetched_at()
        .map(|t| format!("fetched {}", t.format("%Y-%m-%d %H:%M:%S UTC")))
        .unwrap_or_else(|| "not fetched".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Worklog</title>
<style>{STYLE}</style>
</head>
<body>
<div class="app">
<header><h1>Worklog</h1><span class="subtitle">{source} · {fetched}</span></header>
{body}
</div>
</body>
</html>
"#,
        source = escape_html(&dashboard.source.describe()),
    )
}

fn summary_section(out: &mut String, table: &SummaryTable) {
    out.push_str(r#"<section class="card"><h2>Total activity</h2><table><thead><tr><th>Identity</th>"#);
    for column in &table.columns {
        let _ = write!(
            out,
            r#"<th class="cat-{}">{}</th>"#,
            slug(column),
            escape_html(column)
        );
    }
    out.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        let _ = write!(
            out,
            r#"<tr><td><a href="/chart?author={}">{}</a></td>"#,
            urlencoding::encode(&row.author),
            escape_html(&row.author)
        );
        for cell in &row.cells {
            match cell {
                Some(v) => {
                    let _ = write!(out, "<td>{}</td>", format_number(*v));
                }
                None => out.push_str(r#"<td class="absent">-</td>"#),
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></section>");
}

fn chart_section(out: &mut String, dashboard: &Dashboard, dataset: &WorklogDataset) {
    out.push_str(r#"<section class="card">"#);
    if let Some(author) = dashboard.charted_author() {
        let _ = write!(
            out,
            r#"<h2>Daily activity <span class="muted">{}</span></h2>"#,
            escape_html(&author.name)
        );
    }
    match dashboard.chart.surface() {
        Some(surface) => out.push_str(&surface.markup),
        None => out.push_str(r#"<p class="muted">No chart.</p>"#),
    }
    legend(out, &dataset.activity_meta);
    out.push_str("</section>");
}

fn legend(out: &mut String, categories: &[ActivityCategory]) {
    out.push_str(r#"<div class="legend">"#);
    for c in categories {
        let _ = write!(
            out,
            r#"<span class="cat-{}"><span class="swatch" style="background:{}"></span>{}</span>"#,
            slug(&c.label),
            escape_html(&c.fill_color),
            escape_html(&c.label)
        );
    }
    out.push_str("</div>");
}

fn accordion_section(
    out: &mut String,
    dataset: &WorklogDataset,
    accordion: &AccordionState,
    chunk_size: usize,
) {
    out.push_str(r#"<section class="card"><h2>Day-wise activity</h2>"#);
    for (i, row) in dataset.rows.iter().enumerate() {
        author_panel(out, i, row, accordion.is_expanded(i), chunk_size);
    }
    out.push_str("</section>");
}

fn author_panel(out: &mut String, index: usize, row: &AuthorRow, open: bool, chunk_size: usize) {
    let _ = write!(
        out,
        r#"<div class="author{}"><a href="/toggle?index={index}"><span class="marker">{}</span>{}</a>"#,
        if open { " open" } else { "" },
        if open { "−" } else { "+" },
        escape_html(&row.name)
    );
    if open {
        if row.day_wise_activity.is_empty() {
            out.push_str(r#"<p class="muted">No day-wise activity.</p>"#);
        }
        for chunk in group_days(&row.day_wise_activity, chunk_size) {
            day_row(out, chunk);
        }
    }
    out.push_str("</div>");
}

fn day_row(out: &mut String, days: &[DayRecord]) {
    out.push_str(r#"<div class="day-row">"#);
    for day in days {
        let _ = write!(out, r#"<div class="day"><h3>{}</h3><ul>"#, escape_html(&day.date));
        for item in day.items() {
            let _ = write!(
                out,
                r#"<li class="cat-{}" style="color:{}">{}: {}</li>"#,
                slug(&item.label),
                escape_html(&item.fill_color),
                escape_html(&item.label),
                escape_html(&item.count)
            );
        }
        out.push_str("</ul></div>");
    }
    out.push_str("</div>");
}
