//! Embedded web dashboard for salesdash.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page sales dashboard
//! - JSON API endpoints for years, reports, config and health
//!
//! Launched via `salesdash web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::config::SalesdashConfig;
use crate::data::Dataset;
use crate::logging::EventLog;

/// What every request handler can see. Built once before the server starts.
pub struct AppState<'a> {
    pub dataset: &'a Dataset,
    pub config: &'a SalesdashConfig,
    pub events: EventLog,
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Requests are handled one at a time against the
/// already-loaded dataset; a failing handler becomes a 500 response and the
/// server keeps going.
pub fn serve(addr: &str, state: &AppState<'_>, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("salesdash dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        let url = format!("http://{addr}");
        let _ = open_browser(&url);
    }

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let result = dispatch(&method, &url, state);

        match result {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                let _ = request.respond(error_response(&e));
            }
        }

        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    method: &Method,
    url: &str,
    state: &AppState<'_>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API
        (&Method::Get, "/api/years") => api::get_years(state),
        (&Method::Get, "/api/report") => api::get_report(url, state),
        (&Method::Get, "/api/config") => api::get_config(state),
        (&Method::Get, "/api/health") => api::get_health(state),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

fn error_response(err: &anyhow::Error) -> Response<Cursor<Vec<u8>>> {
    Response::from_data(error_body(err).into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(500))
}

fn error_body(err: &anyhow::Error) -> String {
    serde_json::json!({ "error": format!("{err:#}") }).to_string()
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::References;

    #[test]
    fn routes_known_paths() {
        let dataset = Dataset::new(Vec::new(), References::default());
        let config = SalesdashConfig::default();
        let state = AppState {
            dataset: &dataset,
            config: &config,
            events: EventLog::disabled(),
        };

        for path in ["/", "/index.html", "/api/years", "/api/report?year=2023", "/api/health"] {
            let resp = dispatch(&Method::Get, path, &state).unwrap();
            assert_eq!(resp.status_code(), StatusCode(200), "{path}");
        }
        assert!(frontend::INDEX_HTML.contains("/api/report?"));
    }

    #[test]
    fn frontend_reads_state_ranking_labels() {
        assert!(frontend::INDEX_HTML.contains("esc(s.label)"));
        assert!(!frontend::INDEX_HTML.contains("s.state"));
    }

    #[test]
    fn unknown_path_is_404() {
        let dataset = Dataset::new(Vec::new(), References::default());
        let config = SalesdashConfig::default();
        let state = AppState {
            dataset: &dataset,
            config: &config,
            events: EventLog::disabled(),
        };

        let resp = dispatch(&Method::Get, "/api/nope", &state).unwrap();
        assert_eq!(resp.status_code(), StatusCode(404));
        let resp = dispatch(&Method::Post, "/api/report", &state).unwrap();
        assert_eq!(resp.status_code(), StatusCode(404));
    }

    #[test]
    fn errors_render_as_json() {
        let err = anyhow::anyhow!("boom").context("while building");
        assert_eq!(error_response(&err).status_code(), StatusCode(500));
        let body: serde_json::Value = serde_json::from_str(&error_body(&err)).unwrap();
        assert_eq!(body["error"], "while building: boom");
    }
}
