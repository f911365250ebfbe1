//! JSON API handlers for the web dashboard.
//!
//! Every handler answers with an empty structure when no dataset has been
//! loaded yet, never with an error.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::schema::WorklogConfig;
use crate::grouping::group_days;
use crate::schema::DayRecord;
use crate::series::{ChartSeries, build_author_series, select_author};
use crate::summary::{SummaryTable, build_summary};

use super::{Dashboard, Reply, query_param};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    refreshed: bool,
    generation: u64,
    error: Option<String>,
    authors: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesResponse {
    author: Option<String>,
    series: ChartSeries,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DaysResponse<'a> {
    author: Option<String>,
    chunk_size: usize,
    groups: Vec<&'a [DayRecord]>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    source: String,
    has_dataset: bool,
    generation: u64,
    fetched_at: Option<String>,
    last_error: Option<String>,
    authors: usize,
    categories: usize,
    schema_warnings: Vec<String>,
    chart_phase: String,
    chart_rebuilds: usize,
}

/// Config API response: the full config as a JSON value plus the TOML text.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse<'a> {
    config: &'a WorklogConfig,
    toml_text: String,
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `POST /api/refresh`: refetch the payload.
pub fn post_refresh(dashboard: &mut Dashboard) -> Result<Reply> {
    let refreshed = dashboard.refresh()?;
    let state = dashboard.state();
    Reply::json(&RefreshResponse {
        refreshed,
        generation: state.generation(),
        error: state.last_error().map(str::to_string),
        authors: state.dataset().map_or(0, |d| d.rows.len()),
    })
}

/// `GET /api/summary`: per-author totals.
pub fn get_summary(dashboard: &Dashboard) -> Result<Reply> {
    let table = dashboard
        .state()
        .dataset()
        .map(build_summary)
        .unwrap_or_else(SummaryTable::default);
    Reply::json(&table)
}

/// `GET /api/series?author=NAME`: aligned series for one author.
///
/// Without `author` the dashboard's charted author is used.
pub fn get_series(dashboard: &Dashboard, url: &str) -> Result<Reply> {
    let requested = query_param(url, "author").filter(|a| !a.is_empty());
    let resp = match dashboard.state().dataset() {
        Some(dataset) => {
            let name = requested.as_deref().or(dashboard.selected.as_deref());
            match select_author(dataset, name) {
                Some(row) => SeriesResponse {
                    author: Some(row.name.clone()),
                    series: build_author_series(dataset, row),
                },
                None => empty_series(),
            }
        }
        None => empty_series(),
    };
    Reply::json(&resp)
}

fn empty_series() -> SeriesResponse {
    SeriesResponse {
        author: None,
        series: ChartSeries::default(),
    }
}

/// `GET /api/days?author=NAME&chunk=N`: grouped day list for one author.
pub fn get_days(dashboard: &Dashboard, url: &str) -> Result<Reply> {
    let requested = query_param(url, "author").filter(|a| !a.is_empty());
    let chunk_size = query_param(url, "chunk")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(dashboard.config().display.chunk_size)
        .max(1);

    let row = dashboard
        .state()
        .dataset()
        .and_then(|d| select_author(d, requested.as_deref().or(dashboard.selected.as_deref())));

    let resp = DaysResponse {
        author: row.map(|r| r.name.clone()),
        chunk_size,
        groups: row
            .map(|r| group_days(&r.day_wise_activity, chunk_size))
            .unwrap_or_default(),
    };
    Reply::json(&resp)
}

/// `GET /api/chart.svg`: markup of the live chart surface.
pub fn get_chart_svg(dashboard: &Dashboard) -> Reply {
    let markup = dashboard
        .chart()
        .surface()
        .map(|s| s.markup.clone())
        .unwrap_or_else(|| r#"<svg xmlns="http://www.w3.org/2000/svg" width="0" height="0"></svg>"#.to_string());
    Reply::svg(markup)
}

/// `GET /api/health`: dataset and chart status.
pub fn get_health(dashboard: &Dashboard) -> Result<Reply> {
    let state = dashboard.state();
    let dataset = state.dataset();
    let resp = HealthResponse {
        source: dashboard.source.describe(),
        has_dataset: dataset.is_some(),
        generation: state.generation(),
        fetched_at: state.fetched_at().map(|t| t.to_rfc3339()),
        last_error: state.last_error().map(str::to_string),
        authors: dataset.map_or(0, |d| d.rows.len()),
        categories: dataset.map_or(0, |d| d.activity_meta.len()),
        schema_warnings: dataset
            .map(|d| d.validate().iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
        chart_phase: format!("{:?}", dashboard.chart().phase()),
        chart_rebuilds: dashboard.chart().rebuilds(),
    };
    Reply::json(&resp)
}

/// `GET /api/config`: effective configuration of this dashboard.
pub fn get_config(dashboard: &Dashboard) -> Result<Reply> {
    let config = dashboard.config();
    let toml_text = toml::to_string_pretty(config).context("failed to serialize config")?;
    Reply::json(&ConfigResponse { config, toml_text })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::tests::{dashboard, empty_dashboard};
    use super::*;
    use tiny_http::Method;

    fn json(dashboard: &mut Dashboard, method: Method, url: &str) -> serde_json::Value {
        let reply = dashboard.dispatch(&method, url).unwrap();
        assert_eq!(reply.status, 200, "{url}: {}", reply.body);
        assert!(reply.content_type.starts_with("application/json"));
        serde_json::from_str(&reply.body).unwrap()
    }

    #[test]
    fn summary_has_absent_cells_as_null() {
        let mut d = dashboard();
        let v = json(&mut d, Method::Get, "/api/summary");
        assert_eq!(v["columns"][1], "PR Reviews");
        assert_eq!(v["rows"][1]["cells"][0], 5);
        assert!(v["rows"][1]["cells"][1].is_null());
    }

    #[test]
    fn series_for_requested_author() {
        let mut d = dashboard();
        let v = json(&mut d, Method::Get, "/api/series?author=bob");
        assert_eq!(v["author"], "bob");
        assert_eq!(v["series"]["labels"].as_array().unwrap().len(), 1);
        assert_eq!(v["series"]["datasets"].as_array().unwrap().len(), 2);

        let v = json(&mut d, Method::Get, "/api/series");
        assert_eq!(v["author"], "alice <a@x.io>");
    }

    #[test]
    fn days_are_grouped() {
        let mut d = dashboard();
        let v = json(&mut d, Method::Get, "/api/days?chunk=1");
        assert_eq!(v["chunkSize"], 1);
        assert_eq!(v["groups"].as_array().unwrap().len(), 2);

        let v = json(&mut d, Method::Get, "/api/days?chunk=0");
        assert_eq!(v["chunkSize"], 1);
    }

    #[test]
    fn empty_dashboard_answers_empty_structures() {
        let mut d = empty_dashboard();
        let v = json(&mut d, Method::Get, "/api/summary");
        assert!(v["rows"].as_array().unwrap().is_empty());
        let v = json(&mut d, Method::Get, "/api/series");
        assert!(v["author"].is_null());
        let v = json(&mut d, Method::Get, "/api/days");
        assert!(v["groups"].as_array().unwrap().is_empty());
        let v = json(&mut d, Method::Get, "/api/health");
        assert_eq!(v["hasDataset"], false);
        assert_eq!(v["chartPhase"], "Unattached");
        assert!(v["lastError"].is_string());

        let svg = d.dispatch(&Method::Get, "/api/chart.svg").unwrap();
        assert_eq!(svg.status, 200);
        assert!(svg.body.starts_with("<svg"));
    }

    #[test]
    fn refresh_failure_reports_error() {
        let mut d = dashboard();
        let v = json(&mut d, Method::Post, "/api/refresh");
        assert_eq!(v["refreshed"], false);
        assert_eq!(v["generation"], 1);
        assert_eq!(v["authors"], 2);
        assert!(v["error"].is_string());
    }

    #[test]
    fn config_includes_toml_text() {
        let mut d = dashboard();
        let v = json(&mut d, Method::Get, "/api/config");
        assert!(v["tomlText"].as_str().unwrap().contains("[display]"));
        assert_eq!(v["config"]["display"]["chunk_size"], 4);
    }

    #[test]
    fn chart_svg_serves_live_surface() {
        let mut d = dashboard();
        let reply = d.dispatch(&Method::Get, "/api/chart.svg").unwrap();
        assert_eq!(reply.content_type, "image/svg+xml");
        assert!(reply.body.contains("Activity Data"));
    }
}
