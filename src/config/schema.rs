/// Configuration schema and defaults for worklog.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[source]`, `[display]`, `[chart]`, `[web]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

use crate::chart::svg::SvgTarget;
use crate::chart::terminal::TerminalTarget;
use crate::grouping::DEFAULT_CHUNK_SIZE;
use crate::series::{ChartOptions, DEFAULT_TITLE};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level worklog configuration.
///
/// Maps directly to the `~/.worklog/config.toml` and `.worklog.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorklogConfig {
    pub source: SourceConfig,
    pub display: DisplayConfig,
    pub chart: ChartConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [source]
// ---------------------------------------------------------------------------

/// Where the worklog payload comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// HTTP endpoint returning the worklog JSON.
    pub url: String,
    /// Local payload file. When non-empty it is used instead of `url`.
    pub path: String,
    /// HTTP request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000/mock.json".to_string(),
            path: String::new(),
            timeout_ms: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Day-wise detail layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Days per detail row.
    pub chunk_size: usize,
    /// Terminal column width of one day card.
    pub day_column_width: usize,
    /// Colored terminal output.
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            day_column_width: 24,
            color: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [chart]
// ---------------------------------------------------------------------------

/// Chart appearance and author selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: String,
    pub show_title: bool,
    /// Inline legend inside the chart. The category legend beside the chart
    /// is always shown.
    pub show_legend: bool,
    pub begin_at_zero: bool,
    /// Author to chart. Empty selects the first row.
    pub author: String,
    /// Terminal columns for the longest bar.
    pub bar_width: usize,
    pub svg_width: u32,
    pub svg_height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            show_title: true,
            show_legend: false,
            begin_at_zero: true,
            author: String::new(),
            bar_width: 48,
            svg_width: 960,
            svg_height: 400,
        }
    }
}

impl ChartConfig {
    pub fn options(&self) -> ChartOptions {
        ChartOptions {
            title: self.title.clone(),
            show_title: self.show_title,
            show_legend: self.show_legend,
            begin_at_zero: self.begin_at_zero,
        }
    }

    /// Configured author, `None` when unset.
    pub fn author(&self) -> Option<&str> {
        Some(self.author.as_str()).filter(|a| !a.is_empty())
    }

    pub fn terminal_target(&self, color: bool) -> TerminalTarget {
        TerminalTarget {
            bar_width: self.bar_width.max(1),
            color,
        }
    }

    pub fn svg_target(&self) -> SvgTarget {
        SvgTarget {
            width: self.svg_width.max(200),
            height: self.svg_height.max(120),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Event log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether event logging is enabled.
    pub enabled: bool,
    /// Path to the event log file. `~` is expanded to the home directory.
    pub path: String,
    /// Minimum level written: `"debug"`, `"info"`, `"warn"`, `"error"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.worklog/events.jsonl".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

impl WorklogConfig {
    /// Clamp values that would make a view degenerate.
    pub fn normalize(&mut self) {
        self.display.chunk_size = self.display.chunk_size.max(1);
        self.display.day_column_width = self.display.day_column_width.max(8);
        self.chart.bar_width = self.chart.bar_width.max(1);
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl WorklogConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `worklog config init`.
    pub fn default_toml() -> String {
        r#"# worklog Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (WORKLOG_*)
#   2. Project config (.worklog.toml in current directory)
#   3. User global config (~/.worklog/config.toml)
#   4. Built-in defaults

[source]
url = "http://localhost:3000/mock.json"
path = ""                             # Local payload file; overrides url when set
timeout_ms = 5000

[display]
chunk_size = 4                        # Days per detail row
day_column_width = 24
color = true

[chart]
title = "Activity Data"
show_title = true
show_legend = false                   # Inline legend; the side legend is always shown
begin_at_zero = true
author = ""                           # Empty = first author in the payload
bar_width = 48
svg_width = 960
svg_height = 400

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true
path = "~/.worklog/events.jsonl"
level = "info"                        # debug | info | warn | error
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = WorklogConfig::default();
        assert_eq!(config.display.chunk_size, 4);
        assert_eq!(config.chart.title, "Activity Data");
        assert!(config.chart.show_title);
        assert!(!config.chart.show_legend);
        assert!(config.chart.begin_at_zero);
        assert!(config.source.path.is_empty());
        assert!(config.logging.enabled);
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[display]
chunk_size = 7
"#;
        let config: WorklogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.display.chunk_size, 7);
        assert_eq!(config.display.day_column_width, 24);
        assert_eq!(config.web.addr, "127.0.0.1:9747");
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: WorklogConfig = toml::from_str("").unwrap();
        assert_eq!(config, WorklogConfig::default());
    }

    #[test]
    fn default_toml_parses_back() {
        let config: WorklogConfig = toml::from_str(&WorklogConfig::default_toml()).unwrap();
        assert_eq!(config, WorklogConfig::default());
    }

    #[test]
    fn normalize_clamps_chunk_size() {
        let mut config = WorklogConfig::default();
        config.display.chunk_size = 0;
        config.chart.bar_width = 0;
        config.normalize();
        assert_eq!(config.display.chunk_size, 1);
        assert_eq!(config.chart.bar_width, 1);
    }

    #[test]
    fn chart_config_maps_to_options() {
        let mut chart = ChartConfig::default();
        chart.title = "Team".to_string();
        chart.show_legend = true;
        let opts = chart.options();
        assert_eq!(opts.title, "Team");
        assert!(opts.show_legend);
        assert_eq!(chart.author(), None);
        chart.author = "alice".to_string();
        assert_eq!(chart.author(), Some("alice"));
    }
}
