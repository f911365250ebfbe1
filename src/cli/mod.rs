//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `worklog show`: summary table, bar chart and day-wise accordion
//! - `worklog summary`: per-author totals
//! - `worklog series`: aligned chart series for one author
//! - `worklog days`: grouped day list for one author
//! - `worklog browse`: interactive session
//! - `worklog health`: config, source and event log status
//! - `worklog config show|init|set|reset`: configuration management

pub mod browse;
pub mod render;

use anyhow::Result;
use colored::Colorize;

use crate::accordion::AccordionState;
use crate::chart::ChartHandle;
use crate::chart::terminal::TerminalBackend;
use crate::config::{self, schema::WorklogConfig};
use crate::grouping::{chunk_count, group_days};
use crate::logging::EventLog;
use crate::schema::{AuthorRow, WorklogDataset};
use crate::series::{ChartSeries, build_author_series, select_author};
use crate::source::{DatasetState, Source};
use crate::summary::{SummaryTable, build_summary};
use crate::utils::text::csv_field;

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Config, source and logger shared by every data command.
pub struct Context {
    pub config: WorklogConfig,
    pub source: Source,
    pub log: EventLog,
}

impl Context {
    pub fn load() -> Self {
        let config = config::load();
        if !config.display.color {
            colored::control::set_override(false);
        }
        let source = Source::from_config(&config.source);
        let log = EventLog::from_config(&config.logging);
        Self {
            config,
            source,
            log,
        }
    }

    fn fetch(&self) -> DatasetState {
        DatasetState::load(&self.source, &self.log)
    }
}

/// Print the "no data" notice. Returns the dataset when there is one.
fn dataset_or_notice(state: &DatasetState) -> Option<&WorklogDataset> {
    if let Some(dataset) = state.dataset() {
        return Some(dataset);
    }
    println!("{}", "No data yet. The payload could not be loaded.".yellow());
    if let Some(err) = state.last_error() {
        println!("  {}", err.dimmed());
    }
    None
}

fn author_or_notice<'a>(dataset: &'a WorklogDataset, name: Option<&str>) -> Option<&'a AuthorRow> {
    if let Some(n) = name
        && dataset.author(n).is_none()
    {
        println!(
            "{}",
            format!("No author named '{n}', showing the first row.").yellow()
        );
    }
    let author = select_author(dataset, name);
    if author.is_none() {
        println!("{}", "The payload has no author rows.".yellow());
    }
    author
}

// ---------------------------------------------------------------------------
// worklog show
// ---------------------------------------------------------------------------

/// Print the full worklog view.
pub fn run_show(author: Option<&str>, expand: &[usize], chunk_size: Option<usize>) -> Result<()> {
    let ctx = Context::load();
    let state = ctx.fetch();
    let Some(dataset) = dataset_or_notice(&state) else {
        return Ok(());
    };

    println!("{}", "Worklog".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    print!("{}", render::summary_table(&build_summary(dataset)));
    println!();

    let author = author.or(ctx.config.chart.author());
    if let Some(row) = author_or_notice(dataset, author) {
        let mut chart = ChartHandle::attach(
            TerminalBackend,
            ctx.config.chart.terminal_target(ctx.config.display.color),
        );
        chart.update(&build_author_series(dataset, row), &ctx.config.chart.options())?;
        println!("{} {}", "Charting".dimmed(), row.name.bold());
        if let Some(surface) = chart.surface() {
            println!("{}", surface.render());
        }
        println!(
            "{}",
            render::legend(&dataset.activity_meta, ctx.config.display.color)
        );
        chart.release();
        println!();
    }

    let mut accordion = AccordionState::new();
    for n in expand {
        if *n == 0 || *n > dataset.rows.len() {
            println!("{}", format!("--expand {n}: no such author").yellow());
            continue;
        }
        accordion.toggle(n - 1);
    }
    let chunk = chunk_size.unwrap_or(ctx.config.display.chunk_size);
    print!(
        "{}",
        render::accordion(dataset, &accordion, chunk, ctx.config.display.day_column_width)
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// worklog summary
// ---------------------------------------------------------------------------

/// Print per-author totals.
pub fn run_summary(format: OutputFormat) -> Result<()> {
    let ctx = Context::load();
    let state = ctx.fetch();
    let Some(dataset) = dataset_or_notice(&state) else {
        return Ok(());
    };
    let table = build_summary(dataset);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
        OutputFormat::Csv => print!("{}", summary_csv(&table)),
        OutputFormat::Table => print!("{}", render::summary_table(&table)),
    }
    Ok(())
}

fn summary_csv(table: &SummaryTable) -> String {
    let mut out = String::from("author");
    for column in &table.columns {
        out.push(',');
        out.push_str(&csv_field(column));
    }
    out.push('\n');
    for row in &table.rows {
        out.push_str(&csv_field(&row.author));
        for cell in &row.cells {
            out.push(',');
            if let Some(v) = cell {
                out.push_str(&v.to_string());
            }
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// worklog series
// ---------------------------------------------------------------------------

/// Print the aligned chart series for one author.
pub fn run_series(author: Option<&str>, format: OutputFormat) -> Result<()> {
    let ctx = Context::load();
    let state = ctx.fetch();
    let Some(dataset) = dataset_or_notice(&state) else {
        return Ok(());
    };
    let Some(row) = author_or_notice(dataset, author.or(ctx.config.chart.author())) else {
        return Ok(());
    };
    let series = build_author_series(dataset, row);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
        OutputFormat::Csv => print!("{}", series_csv(&series)),
        OutputFormat::Table => {
            println!("{} {}", "Series for".bold().cyan(), row.name.bold());
            print!("{}", render::series_table(&series));
        }
    }
    Ok(())
}

fn series_csv(series: &ChartSeries) -> String {
    let mut out = String::from("date");
    for ds in &series.datasets {
        out.push(',');
        out.push_str(&csv_field(&ds.category));
    }
    out.push('\n');
    for (day, label) in series.labels.iter().enumerate() {
        out.push_str(&csv_field(label));
        for ds in &series.datasets {
            out.push_str(&format!(",{}", ds.values.get(day).copied().unwrap_or(0)));
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// worklog days
// ---------------------------------------------------------------------------

/// Print the grouped day list for one author.
pub fn run_days(author: Option<&str>, chunk_size: Option<usize>, format: OutputFormat) -> Result<()> {
    let ctx = Context::load();
    let state = ctx.fetch();
    let Some(dataset) = dataset_or_notice(&state) else {
        return Ok(());
    };
    let Some(row) = author_or_notice(dataset, author.or(ctx.config.chart.author())) else {
        return Ok(());
    };
    let chunk = chunk_size.unwrap_or(ctx.config.display.chunk_size);

    match format {
        OutputFormat::Json => {
            let groups = group_days(&row.day_wise_activity, chunk);
            let value = serde_json::json!({
                "author": row.name,
                "chunkSize": chunk.max(1),
                "groups": groups,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv | OutputFormat::Table => {
            println!(
                "{} {} {}",
                "Days for".bold().cyan(),
                row.name.bold(),
                format!(
                    "({} days in {} rows)",
                    row.day_wise_activity.len(),
                    chunk_count(row.day_wise_activity.len(), chunk)
                )
                .dimmed()
            );
            print!(
                "{}",
                render::day_rows(&row.day_wise_activity, chunk, ctx.config.display.day_column_width)
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// worklog browse
// ---------------------------------------------------------------------------

/// Start the interactive session.
pub fn run_browse() -> Result<()> {
    let ctx = Context::load();
    browse::run(ctx.config, ctx.source, ctx.log)
}

// ---------------------------------------------------------------------------
// worklog health
// ---------------------------------------------------------------------------

/// Check config files, payload source and event log.
pub fn run_health() -> Result<()> {
    println!("{}", "Worklog Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.worklog/config.toml found"
        } else {
            "not found (run `worklog config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".worklog.toml found"
        } else {
            "none (optional)"
        },
    );

    let ctx = Context::load();
    let reachable = ctx.source.is_reachable();
    print_health_item(
        "Payload source",
        reachable,
        &if reachable {
            format!("reachable at {}", ctx.source.describe())
        } else {
            format!("not reachable: {}", ctx.source.describe())
        },
    );

    if reachable {
        let state = ctx.fetch();
        match state.dataset() {
            Some(dataset) => {
                print_health_item(
                    "Payload",
                    true,
                    &format!(
                        "{} authors, {} categories",
                        dataset.rows.len(),
                        dataset.activity_meta.len()
                    ),
                );
                let warnings = dataset.validate();
                print_health_item(
                    "Schema",
                    warnings.is_empty(),
                    &if warnings.is_empty() {
                        "consistent".to_string()
                    } else {
                        format!("{} warnings (first: {})", warnings.len(), warnings[0])
                    },
                );
            }
            None => print_health_item(
                "Payload",
                false,
                state.last_error().unwrap_or("could not be parsed"),
            ),
        }
    }

    match ctx.log.path() {
        Some(path) => {
            let exists = path.exists();
            print_health_item(
                "Event log",
                exists,
                &if exists {
                    format!("{} entries", ctx.log.read_all().len())
                } else {
                    "no log file yet".to_string()
                },
            );
        }
        None => print_health_item("Event log", true, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// worklog config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective Worklog Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.worklog/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.worklog/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".worklog.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".worklog.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "WORKLOG_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.worklog/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesDataset;
    use crate::summary::SummaryRow;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn summary_csv_leaves_absent_cells_empty() {
        let table = SummaryTable {
            columns: vec!["Commits".to_string(), "Pull, Requests".to_string()],
            colors: vec![String::new(), String::new()],
            rows: vec![SummaryRow {
                author: "alice".to_string(),
                cells: vec![Some(3), None],
            }],
        };
        assert_eq!(
            summary_csv(&table),
            "author,Commits,\"Pull, Requests\"\nalice,3,\n"
        );
    }

    #[test]
    fn series_csv_is_day_major() {
        let series = ChartSeries {
            labels: vec!["d1".to_string(), "d2".to_string()],
            datasets: vec![
                SeriesDataset {
                    category: "Commits".to_string(),
                    color: String::new(),
                    values: vec![3, 0],
                },
                SeriesDataset {
                    category: "Reviews".to_string(),
                    color: String::new(),
                    values: vec![0, 1],
                },
            ],
        };
        assert_eq!(series_csv(&series), "date,Commits,Reviews\nd1,3,0\nd2,0,1\n");
    }
}
