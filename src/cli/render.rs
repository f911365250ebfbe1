//! Text rendering for the terminal views.
//!
//! Every function returns a `String` so the views can be printed, diffed in
//! tests, or redrawn by the browse session.

use colored::Colorize;

use crate::accordion::AccordionState;
use crate::grouping::group_days;
use crate::schema::{ActivityCategory, DayRecord, WorklogDataset};
use crate::series::ChartSeries;
use crate::summary::SummaryTable;
use crate::utils::color;
use crate::utils::text::{fit, format_number, truncate};

const NAME_WIDTH: usize = 28;
const CELL_WIDTH: usize = 10;

/// Per-author totals, one column per category.
pub fn summary_table(table: &SummaryTable) -> String {
    let mut out = String::new();

    let mut header = format!("  {}", fit("Identity", NAME_WIDTH));
    for column in &table.columns {
        header.push_str(&format!(" {:>CELL_WIDTH$}", truncate(column, CELL_WIDTH)));
    }
    out.push_str(&header.bold().to_string());
    out.push('\n');
    out.push_str(&format!(
        "  {}\n",
        "-".repeat(NAME_WIDTH + (CELL_WIDTH + 1) * table.columns.len())
    ));

    for (i, row) in table.rows.iter().enumerate() {
        let mut line = format!("  {}", fit(&row.author, NAME_WIDTH));
        for cell in &row.cells {
            let text = cell.map(format_number).unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {text:>CELL_WIDTH$}"));
        }
        if i % 2 == 0 {
            out.push_str(&line);
        } else {
            out.push_str(&line.dimmed().to_string());
        }
        out.push('\n');
    }

    out
}

/// Category legend shown under the chart.
pub fn legend(categories: &[ActivityCategory], use_color: bool) -> String {
    categories
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let swatch = if use_color && color::parse_hex(&c.fill_color).is_some() {
                color::paint("■", &c.fill_color).to_string()
            } else {
                color::glyph(i).to_string()
            };
            format!("{swatch} {}", c.label)
        })
        .collect::<Vec<_>>()
        .join("   ")
}

/// Series as a date × category grid.
pub fn series_table(series: &ChartSeries) -> String {
    let mut out = String::new();
    let date_width = series
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut header = format!("  {:<date_width$}", "Date");
    for ds in &series.datasets {
        header.push_str(&format!(" {:>CELL_WIDTH$}", truncate(&ds.category, CELL_WIDTH)));
    }
    out.push_str(&header.bold().to_string());
    out.push('\n');

    for (day, label) in series.labels.iter().enumerate() {
        let mut line = format!("  {label:<date_width$}");
        for ds in &series.datasets {
            line.push_str(&format!(" {:>CELL_WIDTH$}", ds.values.get(day).copied().unwrap_or(0)));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// One row of day cards laid out side by side.
pub fn day_row(days: &[DayRecord], column_width: usize) -> String {
    let height = days.iter().map(|d| d.items().len()).max().unwrap_or(0);
    let mut lines = vec![String::new(); height + 1];

    for (col, day) in days.iter().enumerate() {
        let sep = if col == 0 { "    " } else { "  " };
        lines[0].push_str(sep);
        lines[0].push_str(&fit(&day.date, column_width).bold().to_string());

        for row in 0..height {
            lines[row + 1].push_str(sep);
            let cell = match day.items().get(row) {
                Some(item) => {
                    let text = fit(&format!("• {}: {}", item.label, item.count), column_width);
                    color::paint(&text, &item.fill_color).to_string()
                }
                None => " ".repeat(column_width),
            };
            lines[row + 1].push_str(&cell);
        }
    }

    let mut out = lines
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

/// Day cards for one author, chunked into rows.
pub fn day_rows(days: &[DayRecord], chunk_size: usize, column_width: usize) -> String {
    if days.is_empty() {
        return format!("    {}\n", "No day-wise activity.".dimmed());
    }
    group_days(days, chunk_size)
        .into_iter()
        .map(|chunk| day_row(chunk, column_width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The day-wise accordion: one header per author, detail for the expanded one.
pub fn accordion(
    dataset: &WorklogDataset,
    state: &AccordionState,
    chunk_size: usize,
    column_width: usize,
) -> String {
    let mut out = String::new();
    for (i, row) in dataset.rows.iter().enumerate() {
        out.push_str(&format!(
            "  [{}] {:>2}. {}\n",
            state.marker(i),
            i + 1,
            row.name.bold()
        ));
        if state.is_expanded(i) {
            out.push_str(&day_rows(&row.day_wise_activity, chunk_size, column_width));
            out.push('\n');
        }
    }
    out
}
