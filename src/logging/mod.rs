//! Structured event log (`~/.worklog/events.jsonl` by default).
//!
//! One JSON object per line: fetch outcomes, schema warnings, chart rebuilds,
//! dashboard requests. Writing is best-effort; a log that cannot be written
//! never interrupts rendering.

use std::fmt;
use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::expand_home;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A single line of the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    /// Short machine-friendly event name, e.g. `"fetch_failed"`.
    pub event: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Level-filtered JSONL writer.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
    min_level: Level,
}

impl EventLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            path: if config.enabled {
                expand_home(&config.path)
            } else {
                None
            },
            min_level: Level::parse(&config.level).unwrap_or(Level::Info),
        }
    }

    /// A logger that writes nothing.
    pub fn disabled() -> Self {
        Self {
            path: None,
            min_level: Level::Error,
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.path.is_some() && level >= self.min_level
    }

    /// Append an event if its level passes the filter.
    pub fn log(&self, level: Level, event: &str, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level,
            event: event.to_string(),
            message: message.into(),
        };
        let _ = self.append(&entry);
    }

    pub fn debug(&self, event: &str, message: impl Into<String>) {
        self.log(Level::Debug, event, message);
    }

    pub fn info(&self, event: &str, message: impl Into<String>) {
        self.log(Level::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: impl Into<String>) {
        self.log(Level::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: impl Into<String>) {
        self.log(Level::Error, event, message);
    }

    fn append(&self, entry: &LogEntry) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read every entry back. Malformed lines are skipped; a missing file is
    /// an empty log.
    pub fn read_all(&self) -> Vec<LogEntry> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<LogEntry>(&line).ok())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str, level: &str) -> EventLog {
        let path = std::env::temp_dir()
            .join(format!("worklog-log-{}", std::process::id()))
            .join(name);
        let _ = fs::remove_file(&path);
        EventLog::from_config(&LoggingConfig {
            enabled: true,
            path: path.to_string_lossy().into_owned(),
            level: level.to_string(),
        })
    }

    #[test]
    fn level_parsing_and_order() {
        assert_eq!(Level::parse("WARN"), Some(Level::Warn));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("loud"), None);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert_eq!(Level::Error.to_string(), "error");
    }

    #[test]
    fn entries_below_level_are_dropped() {
        let log = temp_log("filtered.jsonl", "warn");
        log.info("fetch_ok", "loaded 2 authors");
        log.warn("schema", "author 'bob' has no total for 'Commits'");
        log.error("fetch_failed", "connection refused");

        let entries = log.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Level::Warn);
        assert_eq!(entries[1].event, "fetch_failed");
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let log = EventLog::disabled();
        log.error("fetch_failed", "ignored");
        assert!(log.read_all().is_empty());
        assert!(!log.enabled(Level::Error));
    }

    #[test]
    fn unknown_level_defaults_to_info() {
        let log = temp_log("default-level.jsonl", "chatty");
        assert!(!log.enabled(Level::Debug));
        assert!(log.enabled(Level::Info));
    }
}
