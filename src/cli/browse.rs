//! `worklog browse`: line-driven interactive session.
//!
//! Commands read from stdin, one per line:
//!
//! - `N`: toggle the accordion for author N (1-based)
//! - `c N`: chart author N
//! - `r`: refetch the payload
//! - `h` / `?`: help
//! - `q`: quit
//!
//! The session owns one terminal chart handle for its whole lifetime. Every
//! change of dataset or charted author goes through the handle, and the
//! surface is released when the session ends.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use crate::accordion::AccordionState;
use crate::chart::ChartHandle;
use crate::chart::terminal::TerminalBackend;
use crate::config::schema::WorklogConfig;
use crate::logging::EventLog;
use crate::series::{build_author_series, select_author};
use crate::source::{DatasetState, Source};
use crate::summary::build_summary;

use super::render;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Zero-based author index.
    Toggle(usize),
    /// Zero-based author index.
    Chart(usize),
    Refresh,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse one input line. Author numbers are 1-based on input.
pub fn parse_command(line: &str) -> BrowseCommand {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return BrowseCommand::Empty;
    };

    let one_based = |s: &str| s.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1);

    match head.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => BrowseCommand::Quit,
        "r" | "refresh" => BrowseCommand::Refresh,
        "h" | "help" | "?" => BrowseCommand::Help,
        "c" | "chart" => match parts.next().and_then(one_based) {
            Some(i) => BrowseCommand::Chart(i),
            None => BrowseCommand::Unknown(line.to_string()),
        },
        other => match one_based(other) {
            Some(i) => BrowseCommand::Toggle(i),
            None => BrowseCommand::Unknown(line.to_string()),
        },
    }
}

/// State of one browse session.
pub struct BrowseSession {
    config: WorklogConfig,
    source: Source,
    log: EventLog,
    state: DatasetState,
    accordion: AccordionState,
    chart: ChartHandle<TerminalBackend>,
    chart_author: Option<String>,
    status: Option<String>,
}

impl BrowseSession {
    pub fn new(config: WorklogConfig, source: Source, log: EventLog, state: DatasetState) -> Self {
        let target = config.chart.terminal_target(config.display.color);
        let chart_author = config.chart.author().map(str::to_string);
        Self {
            config,
            source,
            log,
            state,
            accordion: AccordionState::new(),
            chart: ChartHandle::attach(TerminalBackend, target),
            chart_author,
            status: None,
        }
    }

    /// Apply one command. Returns `false` when the session should end.
    pub fn handle(&mut self, command: BrowseCommand) -> Result<bool> {
        self.status = None;
        let rows = self.state.dataset().map_or(0, |d| d.rows.len());

        match command {
            BrowseCommand::Quit => return Ok(false),
            BrowseCommand::Empty => {}
            BrowseCommand::Help => {
                self.status = Some("N toggle author N · c N chart author N · r refetch · q quit".into());
            }
            BrowseCommand::Unknown(line) => {
                self.status = Some(format!("unknown command: {line}"));
            }
            BrowseCommand::Toggle(i) if i < rows => self.accordion.toggle(i),
            BrowseCommand::Chart(i) if i < rows => {
                self.chart_author = self
                    .state
                    .dataset()
                    .and_then(|d| d.rows.get(i))
                    .map(|row| row.name.clone());
            }
            BrowseCommand::Toggle(i) | BrowseCommand::Chart(i) => {
                self.status = Some(format!("no author #{}", i + 1));
            }
            BrowseCommand::Refresh => {
                if self.state.refresh(&self.source, &self.log) {
                    let rows = self.state.dataset().map_or(0, |d| d.rows.len());
                    self.accordion.clamp(rows);
                    self.status = Some("refetched".into());
                } else {
                    let err = self.state.last_error().unwrap_or("unknown error");
                    self.status = Some(format!("refetch failed, keeping previous data: {err}"));
                }
            }
        }

        self.sync_chart()?;
        Ok(true)
    }

    /// Bring the chart surface in line with the dataset and charted author.
    pub fn sync_chart(&mut self) -> Result<()> {
        let Some(dataset) = self.state.dataset() else {
            self.chart.clear();
            return Ok(());
        };
        let Some(author) = select_author(dataset, self.chart_author.as_deref()) else {
            self.chart.clear();
            return Ok(());
        };

        let series = build_author_series(dataset, author);
        let options = self.config.chart.options();
        if self.chart.refresh(&series, &options)? {
            self.log.debug(
                "chart_rebuilt",
                format!("terminal chart for {} ({} days)", author.name, series.labels.len()),
            );
        }
        Ok(())
    }

    /// Full screen for the current state.
    pub fn render(&self) -> String {
        let Some(dataset) = self.state.dataset() else {
            let mut out = format!("{}\n", "No data yet.".yellow());
            if let Some(err) = self.state.last_error() {
                out.push_str(&format!("  {}\n", err.dimmed()));
            }
            return out;
        };

        let mut out = String::new();
        out.push_str(&render::summary_table(&build_summary(dataset)));
        out.push('\n');

        if let Some(author) = select_author(dataset, self.chart_author.as_deref()) {
            out.push_str(&format!("{} {}\n", "Charting".dimmed(), author.name.bold()));
        }
        if let Some(surface) = self.chart.surface() {
            out.push_str(&surface.render());
            out.push('\n');
            out.push_str(&render::legend(&dataset.activity_meta, self.config.display.color));
            out.push('\n');
        }
        out.push('\n');

        out.push_str(&render::accordion(
            dataset,
            &self.accordion,
            self.config.display.chunk_size,
            self.config.display.day_column_width,
        ));

        if let Some(status) = &self.status {
            out.push_str(&format!("\n{}\n", status.cyan()));
        }
        out
    }

    pub fn accordion(&self) -> &AccordionState {
        &self.accordion
    }

    pub fn chart(&self) -> &ChartHandle<TerminalBackend> {
        &self.chart
    }

    pub fn chart_author(&self) -> Option<&str> {
        self.chart_author.as_deref()
    }

    /// End the session and release the chart surface.
    pub fn close(&mut self) {
        self.chart.release();
    }
}

/// Run the session against stdin/stdout until `q` or end of input.
pub fn run(config: WorklogConfig, source: Source, log: EventLog) -> Result<()> {
    let state = DatasetState::load(&source, &log);
    let mut session = BrowseSession::new(config, source, log, state);
    session.sync_chart()?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("{}", session.render());
    print!("{} ", "browse>".bold().cyan());
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let command = parse_command(&line?);
        if !session.handle(command)? {
            break;
        }
        println!();
        print!("{}", session.render());
        print!("{} ", "browse>".bold().cyan());
        stdout.flush()?;
    }

    session.close();
    println!();
    Ok(())
}
