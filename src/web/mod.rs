//! Embedded web dashboard for worklog.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A server-rendered dashboard: totals table, SVG bar chart, day-wise accordion
//! - JSON API endpoints for the summary, series, grouped days, health and config
//!
//! Launched via `worklog serve` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use url::form_urlencoded;

use crate::accordion::AccordionState;
use crate::chart::ChartHandle;
use crate::chart::svg::SvgBackend;
use crate::config::{self, schema::WorklogConfig};
use crate::logging::EventLog;
use crate::schema::AuthorRow;
use crate::series::{build_author_series, select_author};
use crate::source::{DatasetState, Source};

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server.
///
/// `addr` overrides `web.addr`. Blocks the current thread. Requests are
/// handled sequentially, so the dashboard state needs no locking. A failing
/// handler produces a 500 for that request only.
pub fn serve(addr: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let addr = addr.unwrap_or(&cfg.web.addr).to_string();
    let open = cfg.web.open_browser;

    let mut dashboard = Dashboard::load(cfg);
    dashboard.sync_chart()?;

    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("worklog dashboard running at http://{addr}");
    if let Some(err) = dashboard.state.last_error() {
        println!("initial fetch failed: {err}");
    }
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let reply = match dashboard.dispatch(&method, &url) {
            Ok(reply) => reply,
            Err(e) => Reply::error(&e),
        };
        let status = reply.status;

        match reply.into_response() {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                let _ = request
                    .respond(Response::from_string(e.to_string()).with_status_code(StatusCode(500)));
            }
        }

        dashboard
            .log
            .debug("request", format!("{method} {url} {status}"));
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// A handler result before it is turned into a `tiny_http` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// `Location` header for redirects.
    pub location: Option<String>,
}

impl Reply {
    pub fn json<T: serde::Serialize>(data: &T) -> Result<Self> {
        let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
        Ok(Self::with_body(200, "application/json; charset=utf-8", body))
    }

    pub fn html(body: String) -> Self {
        Self::with_body(200, "text/html; charset=utf-8", body)
    }

    pub fn svg(body: String) -> Self {
        Self::with_body(200, "image/svg+xml", body)
    }

    /// 303 See Other back to `location`.
    pub fn redirect(location: &str) -> Self {
        Self {
            status: 303,
            content_type: "text/plain; charset=utf-8",
            body: String::new(),
            location: Some(location.to_string()),
        }
    }

    pub fn not_found() -> Self {
        Self::with_body(
            404,
            "application/json; charset=utf-8",
            r#"{"error":"not found"}"#.to_string(),
        )
    }

    pub fn bad_request(message: &str) -> Self {
        Self::with_body(
            400,
            "application/json; charset=utf-8",
            serde_json::json!({ "error": message }).to_string(),
        )
    }

    pub fn error(err: &anyhow::Error) -> Self {
        Self::with_body(
            500,
            "application/json; charset=utf-8",
            serde_json::json!({ "error": format!("{err:#}") }).to_string(),
        )
    }

    fn with_body(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body,
            location: None,
        }
    }

    fn into_response(self) -> Result<Response<Cursor<Vec<u8>>>> {
        let mut resp = Response::from_data(self.body.into_bytes())
            .with_header(header("Content-Type", self.content_type)?)
            .with_status_code(StatusCode(self.status));
        if let Some(location) = &self.location {
            resp = resp.with_header(header("Location", location)?);
        }
        Ok(resp)
    }
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|()| anyhow::anyhow!("invalid header {name}: {value}"))
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything one running dashboard owns: the dataset, the accordion, the
/// charted author and the chart surface.
pub struct Dashboard {
    config: WorklogConfig,
    source: Source,
    log: EventLog,
    state: DatasetState,
    accordion: AccordionState,
    selected: Option<String>,
    chart: ChartHandle<SvgBackend>,
}

impl Dashboard {
    pub fn new(config: WorklogConfig, source: Source, log: EventLog, state: DatasetState) -> Self {
        let chart = ChartHandle::attach(SvgBackend, config.chart.svg_target());
        let selected = config.chart.author().map(str::to_string);
        Self {
            config,
            source,
            log,
            state,
            accordion: AccordionState::new(),
            selected,
            chart,
        }
    }

    /// Build from config and perform the initial fetch.
    pub fn load(config: WorklogConfig) -> Self {
        let source = Source::from_config(&config.source);
        let log = EventLog::from_config(&config.logging);
        let state = DatasetState::load(&source, &log);
        Self::new(config, source, log, state)
    }

    /// Route one request.
    pub fn dispatch(&mut self, method: &Method, url: &str) -> Result<Reply> {
        let path = url.split('?').next().unwrap_or(url);

        match (method, path) {
            // Pages
            (&Method::Get, "/") | (&Method::Get, "/index.html") => {
                Ok(Reply::html(frontend::page(self)))
            }
            (&Method::Get, "/toggle") => {
                let Some(index) = query_param(url, "index").and_then(|v| v.parse().ok()) else {
                    return Ok(Reply::bad_request("expected ?index=N"));
                };
                if index < self.row_count() {
                    self.accordion.toggle(index);
                }
                Ok(Reply::redirect("/"))
            }
            (&Method::Get, "/chart") => {
                self.selected = query_param(url, "author").filter(|a| !a.is_empty());
                self.sync_chart()?;
                Ok(Reply::redirect("/"))
            }

            // API
            (&Method::Post, "/api/refresh") => api::post_refresh(self),
            (&Method::Get, "/api/summary") => api::get_summary(self),
            (&Method::Get, "/api/series") => api::get_series(self, url),
            (&Method::Get, "/api/days") => api::get_days(self, url),
            (&Method::Get, "/api/chart.svg") => Ok(api::get_chart_svg(self)),
            (&Method::Get, "/api/health") => api::get_health(self),
            (&Method::Get, "/api/config") => api::get_config(self),

            _ => Ok(Reply::not_found()),
        }
    }

    /// Refetch the payload. A failure keeps the current dataset.
    pub fn refresh(&mut self) -> Result<bool> {
        let replaced = self.state.refresh(&self.source, &self.log);
        if replaced {
            let rows = self.row_count();
            self.accordion.clamp(rows);
            self.sync_chart()?;
        }
        Ok(replaced)
    }

    /// Bring the SVG surface in line with the dataset and charted author.
    pub fn sync_chart(&mut self) -> Result<()> {
        let Some(dataset) = self.state.dataset() else {
            self.chart.clear();
            return Ok(());
        };
        let Some(author) = select_author(dataset, self.selected.as_deref()) else {
            self.chart.clear();
            return Ok(());
        };

        let series = build_author_series(dataset, author);
        if self.chart.refresh(&series, &self.config.chart.options())? {
            self.log.debug(
                "chart_rebuilt",
                format!("svg chart for {} ({} days)", author.name, series.labels.len()),
            );
        }
        Ok(())
    }

    /// The author the chart reflects.
    pub fn charted_author(&self) -> Option<&AuthorRow> {
        self.state
            .dataset()
            .and_then(|d| select_author(d, self.selected.as_deref()))
    }

    pub fn state(&self) -> &DatasetState {
        &self.state
    }

    pub fn accordion(&self) -> &AccordionState {
        &self.accordion
    }

    pub fn chart(&self) -> &ChartHandle<SvgBackend> {
        &self.chart
    }

    pub fn config(&self) -> &WorklogConfig {
        &self.config
    }

    fn row_count(&self) -> usize {
        self.state.dataset().map_or(0, |d| d.rows.len())
    }
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// Value of `key` in the query string of `url`, form-decoded.
fn query_param(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
