//! HTTP surface: a single-page search form plus JSON endpoints.
//!
//! The credential arrives with each request and is only held for the
//! duration of that request's [`Session`].

use crate::config::{current_year, DEFAULT_ROWS, DEFAULT_START_YEAR, MIN_YEAR};
use crate::crossref::{CrossrefClient, SearchCriteria};
use crate::error::Result;
use crate::session::{redact, SearchOutcome, Session};
use crate::summarizer::{Summarizer, Summary};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Shared, read-only server state
#[derive(Debug, Clone)]
pub struct AppState {
    crossref: CrossrefClient,
    summarizer: Summarizer,
}

impl AppState {
    pub fn new(crossref: CrossrefClient, summarizer: Summarizer) -> Self {
        Self {
            crossref,
            summarizer,
        }
    }

    fn session(&self, api_key: Option<String>) -> Session {
        Session::new(self.crossref.clone(), self.summarizer.clone(), api_key)
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .route("/summarize", post(summarize_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Bind and serve until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Error body for rejected requests
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error }))
}

/// Malformed or mistyped JSON gets the same error body as failed validation
fn rejection_error(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Rejected request body");
    bad_request(rejection.body_text())
}

/// Search request body
#[derive(Deserialize)]
pub struct SearchBody {
    pub keyword: String,
    #[serde(default)]
    pub open_access_only: bool,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Generate summaries in the same call when a key is supplied
    #[serde(default = "default_true")]
    pub summarize: bool,
}

fn default_true() -> bool {
    true
}

impl fmt::Debug for SearchBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchBody")
            .field("keyword", &self.keyword)
            .field("open_access_only", &self.open_access_only)
            .field("journal", &self.journal)
            .field("start_year", &self.start_year)
            .field("end_year", &self.end_year)
            .field("rows", &self.rows)
            .field("api_key", &redact(&self.api_key))
            .field("summarize", &self.summarize)
            .finish()
    }
}

/// Summarize request body
#[derive(Deserialize)]
pub struct SummarizeBody {
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for SummarizeBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizeBody")
            .field("abstract_text", &self.abstract_text)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// Summarize response body
#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: Summary,
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Search form page
async fn index_handler() -> Html<String> {
    Html(index_html(current_year()))
}

/// Search endpoint handler
async fn search_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SearchBody>, JsonRejection>,
) -> std::result::Result<Json<SearchOutcome>, ApiError> {
    let Json(body) = payload.map_err(rejection_error)?;
    let criteria = SearchCriteria {
        keyword: body.keyword,
        open_access_only: body.open_access_only,
        journal: body.journal.map(|j| j.trim().to_string()),
        start_year: body.start_year,
        end_year: body.end_year,
    };

    if let Err(e) = criteria.validate() {
        warn!(error = %e, "Rejected search request");
        return Err(bad_request(e.to_string()));
    }

    let session = state.session(body.api_key);
    let mut outcome = session
        .search(&criteria, body.rows.unwrap_or(DEFAULT_ROWS))
        .await;
    if body.summarize {
        session.summarize_panels(&mut outcome).await;
    }

    Ok(Json(outcome))
}

/// Single abstract summary handler
async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SummarizeBody>, JsonRejection>,
) -> std::result::Result<Json<SummarizeResponse>, ApiError> {
    let Json(body) = payload.map_err(rejection_error)?;
    let summary = state
        .session(body.api_key)
        .summarize(&body.abstract_text)
        .await;
    Ok(Json(SummarizeResponse { summary }))
}

/// Search form with year inputs bounded to `[MIN_YEAR, max_year]`
fn index_html(max_year: i32) -> String {
    INDEX_TEMPLATE
        .replace("{min_year}", &MIN_YEAR.to_string())
        .replace("{max_year}", &max_year.to_string())
        .replace("{start_year}", &DEFAULT_START_YEAR.to_string())
}

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Bioinformatics Paper Search</title>
<style>
body { font-family: sans-serif; display: flex; margin: 0; }
aside { width: 260px; padding: 1rem; background: #f3f4f6; min-height: 100vh; }
main { flex: 1; padding: 1rem 2rem; }
label { display: block; margin-top: .8rem; }
input[type=text], input[type=password], input[type=number] { width: 100%; box-sizing: border-box; }
.banner { padding: .6rem; margin: 1rem 0; border-radius: 4px; }
.ok { background: #dcfce7; } .warn { background: #fef9c3; } .error { background: #fee2e2; } .info { background: #dbeafe; }
details { border: 1px solid #ddd; border-radius: 4px; margin: .5rem 0; padding: .5rem; }
summary { font-weight: bold; cursor: pointer; }
</style>
</head>
<body>
<aside>
  <label>OpenAI API Key<input id="api_key" type="password" autocomplete="off"></label>
  <h3>Filters</h3>
  <label><input id="open_access" type="checkbox"> Open Access only</label>
  <label>Journal name filter (optional)<input id="journal" type="text"></label>
  <label>Start year<input id="start_year" type="number" min="{min_year}" max="{max_year}" value="{start_year}"></label>
  <label>End year<input id="end_year" type="number" min="{min_year}" max="{max_year}" value="{max_year}"></label>
</aside>
<main>
  <h1>BioMedical and Bioinformatics Research Paper Search with AI Summaries</h1>
  <input id="keyword" type="text" placeholder="e.g., gene expression, RNA-seq">
  <button id="search">Search</button>
  <div id="status"></div>
  <div id="results"></div>
</main>
<script>
const $ = (id) => document.getElementById(id);

function block(cls, text) {
  const div = document.createElement("div");
  div.className = "banner " + cls;
  div.textContent = text;
  return div;
}

function line(label, text) {
  const p = document.createElement("p");
  const b = document.createElement("b");
  b.textContent = label + ": ";
  p.append(b, text);
  return p;
}

function renderPanel(panel) {
  const r = panel.record;
  const details = document.createElement("details");
  const summary = document.createElement("summary");
  summary.textContent = panel.index + ". " + r.title;
  details.append(summary, line("Authors", r.authors), line("Journal", r.journal + " (" + r.year + ")"));
  const a = document.createElement("a");
  a.href = r.link; a.target = "_blank"; a.textContent = "View Paper";
  details.append(a);
  const section = panel.abstract_section;
  if (section.state === "missing") {
    details.append(block("warn", "No abstract available for this paper."));
    return details;
  }
  details.append(line("Abstract", r.abstract_text));
  const slot = section.summary;
  if (slot.state === "needs_key") {
    details.append(block("info", "Enter your OpenAI API key to enable AI summaries."));
  } else if (slot.state === "ready") {
    details.append(line("AI Summary", ""));
    details.append(block(slot.summary.status === "generated" ? "ok" : "warn", slot.summary.text));
  }
  return details;
}

async function runSearch() {
  const keyword = $("keyword").value.trim();
  if (!keyword) return;
  $("status").replaceChildren(block("info", "Searching..."));
  $("results").replaceChildren();
  const body = {
    keyword,
    open_access_only: $("open_access").checked,
    journal: $("journal").value,
    start_year: $("start_year").value ? Number($("start_year").value) : null,
    end_year: $("end_year").value ? Number($("end_year").value) : null,
    api_key: $("api_key").value || null,
  };
  let resp, data;
  try {
    resp = await fetch("/search", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body),
    });
    const text = await resp.text();
    try {
      data = JSON.parse(text);
    } catch (_) {
      data = { error: text || ("HTTP " + resp.status) };
    }
  } catch (err) {
    $("status").replaceChildren(block("error", "Request failed: " + err));
    return;
  }
  if (!resp.ok || !data.banner) {
    $("status").replaceChildren(block("error", data.error || ("HTTP " + resp.status)));
    return;
  }
  const banner = data.banner;
  if (banner.kind === "found") {
    $("status").replaceChildren(block("ok", "Found " + banner.detail + " results"));
  } else if (banner.kind === "no_results") {
    $("status").replaceChildren(block("warn", "No results found. Try refining your search or filters."));
  } else {
    $("status").replaceChildren(block("error", banner.detail));
  }
  $("results").replaceChildren(...data.panels.map(renderPanel));
}

$("search").addEventListener("click", runSearch);
$("keyword").addEventListener("keydown", (e) => { if (e.key === "Enter") runSearch(); });
</script>
</body>
</html>
"#;
