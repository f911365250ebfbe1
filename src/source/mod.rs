//! Payload source and dataset state.
//!
//! Fetches the worklog JSON either over HTTP (synchronous `ureq`) or from a
//! local file, unwraps the `data.AuthorWorklog` envelope, and holds the
//! result in a [`DatasetState`]. A fetch either replaces the whole dataset or
//! leaves the previous one untouched; there is no partial update.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::config::schema::SourceConfig;
use crate::logging::EventLog;
use crate::schema::{WorklogDataset, WorklogResponse};

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where the payload is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Http { url: String, timeout: Duration },
}

impl Source {
    /// A non-empty `path` wins over `url`.
    pub fn from_config(config: &SourceConfig) -> Self {
        if config.path.trim().is_empty() {
            Self::Http {
                url: config.url.clone(),
                timeout: Duration::from_millis(config.timeout_ms),
            }
        } else {
            Self::File(PathBuf::from(config.path.trim()))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Http { url, .. } => url.clone(),
        }
    }

    /// Read and parse the payload.
    pub fn fetch(&self) -> Result<WorklogDataset> {
        let raw = match self {
            Self::File(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read payload file {}", path.display()))?,
            Self::Http { url, timeout } => ureq::get(url)
                .timeout(*timeout)
                .call()
                .with_context(|| format!("request to {url} failed"))?
                .into_string()
                .with_context(|| format!("failed to read response body from {url}"))?,
        };
        parse_payload(&raw)
    }

    /// Whether the source looks reachable, without parsing it.
    pub fn is_reachable(&self) -> bool {
        match self {
            Self::File(path) => path.is_file(),
            Self::Http { url, .. } => ureq::head(url)
                .timeout(Duration::from_secs(3))
                .call()
                .is_ok(),
        }
    }
}

/// Parse a raw `{ "data": { "AuthorWorklog": ... } }` document.
pub fn parse_payload(raw: &str) -> Result<WorklogDataset> {
    let response: WorklogResponse =
        serde_json::from_str(raw).context("payload does not match data.AuthorWorklog shape")?;
    Ok(response.data.author_worklog)
}

// ---------------------------------------------------------------------------
// Dataset state
// ---------------------------------------------------------------------------

/// The current dataset, if any, plus the outcome of the last fetch.
///
/// "No dataset yet" is a normal state: views render nothing until the first
/// successful fetch.
#[derive(Debug, Default)]
pub struct DatasetState {
    dataset: Option<WorklogDataset>,
    last_error: Option<String>,
    fetched_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl DatasetState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch from `source` and apply the result.
    pub fn load(source: &Source, log: &EventLog) -> Self {
        let mut state = Self::new();
        state.refresh(source, log);
        state
    }

    /// Refetch and apply. Returns `true` when the dataset was replaced.
    pub fn refresh(&mut self, source: &Source, log: &EventLog) -> bool {
        let result = source.fetch();
        if let Err(e) = &result {
            log.error(
                "fetch_failed",
                format!("{}: {e:#}", source.describe()),
            );
        }
        self.apply(result, log)
    }

    /// Apply a fetch result.
    ///
    /// Success replaces the dataset wholesale. Failure keeps whatever dataset
    /// was there before and records the error.
    pub fn apply(&mut self, result: Result<WorklogDataset>, log: &EventLog) -> bool {
        match result {
            Ok(dataset) => {
                for warning in dataset.validate() {
                    log.warn("schema_warning", warning.to_string());
                }
                log.info(
                    "fetch_ok",
                    format!(
                        "{} authors, {} categories",
                        dataset.rows.len(),
                        dataset.activity_meta.len()
                    ),
                );
                self.dataset = Some(dataset);
                self.last_error = None;
                self.fetched_at = Some(Utc::now());
                self.generation += 1;
                true
            }
            Err(e) => {
                self.last_error = Some(format!("{e:#}"));
                false
            }
        }
    }

    pub fn dataset(&self) -> Option<&WorklogDataset> {
        self.dataset.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Incremented on every replacement; lets views tell when to recompute.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r##"{"data":{"AuthorWorklog":{
        "activityMeta":[{"label":"Commits","fillColor":"#EF6B6B"}],
        "rows":[{"name":"alice","totalActivity":[{"name":"Commits","value":"3"}],
                 "dayWiseActivity":[{"date":"2024-01-01","items":{"children":[
                    {"count":"3","label":"Commits","fillColor":"#EF6B6B"}]}}]}]}}}"##;

    #[test]
    fn source_prefers_path() {
        let mut cfg = SourceConfig::default();
        assert!(matches!(Source::from_config(&cfg), Source::Http { .. }));
        cfg.path = " ./mock.json ".to_string();
        assert_eq!(
            Source::from_config(&cfg),
            Source::File(PathBuf::from("./mock.json"))
        );
    }

    #[test]
    fn parse_payload_unwraps_envelope() {
        let ds = parse_payload(PAYLOAD).unwrap();
        assert_eq!(ds.rows[0].name, "alice");
    }

    #[test]
    fn parse_payload_rejects_wrong_shape() {
        assert!(parse_payload(r#"{"rows":[]}"#).is_err());
        assert!(parse_payload("not json").is_err());
    }

    #[test]
    fn failed_refetch_keeps_previous_dataset() {
        let log = EventLog::disabled();
        let mut state = DatasetState::new();
        assert!(state.dataset().is_none());

        assert!(state.apply(parse_payload(PAYLOAD), &log));
        assert_eq!(state.generation(), 1);
        assert!(state.fetched_at().is_some());

        assert!(!state.apply(parse_payload("{}"), &log));
        assert_eq!(state.generation(), 1);
        assert!(state.last_error().is_some());
        assert_eq!(state.dataset().unwrap().rows[0].name, "alice");
    }

    #[test]
    fn missing_file_is_no_dataset() {
        let source = Source::File(PathBuf::from("/nonexistent/worklog/mock.json"));
        let state = DatasetState::load(&source, &EventLog::disabled());
        assert!(state.dataset().is_none());
        assert!(state.last_error().unwrap().contains("failed to read payload file"));
        assert!(!source.is_reachable());
    }
}
