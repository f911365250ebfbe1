use anyhow::Result;
use clap::{Parser, Subcommand};

use worklog::cli::{self, OutputFormat};
use worklog::web;

#[derive(Debug, Parser)]
#[command(name = "worklog")]
#[command(about = "Per-author activity worklog: totals, daily chart, day-by-day detail")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the summary table, the bar chart and the day-wise accordion
    Show {
        /// Author to chart (defaults to chart.author, then the first row)
        #[arg(long)]
        author: Option<String>,
        /// Toggle the accordion for author N (1-based, repeatable)
        #[arg(long)]
        expand: Vec<usize>,
        /// Days per row in the expanded detail
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Print per-author totals
    Summary {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Print the aligned chart series for one author
    Series {
        #[arg(long)]
        author: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Print the grouped day list for one author
    Days {
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Interactive session: N toggles, `c N` charts, `r` refetches, `q` quits
    Browse,
    /// Serve the web dashboard
    Serve {
        /// Listen address (defaults to web.addr)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Check config files, payload source and event log
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective (merged) configuration
    Show,
    /// Write a default config file to ~/.worklog/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set one dotted key, e.g. `display.chunk_size 6`
    Set { key: String, value: String },
    /// Rewrite the global config file with defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Show {
            author,
            expand,
            chunk_size,
        } => cli::run_show(author.as_deref(), &expand, chunk_size),
        Commands::Summary { format } => {
            cli::run_summary(OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Series { author, format } => cli::run_series(
            author.as_deref(),
            OutputFormat::from_str_opt(Some(&format)),
        ),
        Commands::Days {
            author,
            chunk_size,
            format,
        } => cli::run_days(
            author.as_deref(),
            chunk_size,
            OutputFormat::from_str_opt(Some(&format)),
        ),
        Commands::Browse => cli::run_browse(),
        Commands::Serve { addr } => web::serve(addr.as_deref()),
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
