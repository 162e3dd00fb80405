use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use biopaper::config::SearchConfig;
use biopaper::crossref::{CrossrefClient, SearchCriteria};
use biopaper::render::render_outcome;
use biopaper::session::{AbstractSection, Banner, SearchOutcome, Session, SummarySlot};
use biopaper::summarizer::{LlmConfig, Summarizer, Summary, DEFAULT_MODEL};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Local stand-in for Crossref and the completion API
#[derive(Default)]
struct Mock {
    works: Mutex<Value>,
    works_status: Mutex<Option<StatusCode>>,
    last_query: Mutex<HashMap<String, String>>,
    completion_calls: AtomicUsize,
    last_completion: Mutex<Value>,
}

async fn works(
    State(mock): State<Arc<Mock>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    *mock.last_query.lock().unwrap() = params;
    let status = mock.works_status.lock().unwrap().unwrap_or(StatusCode::OK);
    (status, Json(mock.works.lock().unwrap().clone()))
}

async fn completions(State(mock): State<Arc<Mock>>, Json(body): Json<Value>) -> Json<Value> {
    mock.completion_calls.fetch_add(1, Ordering::SeqCst);
    *mock.last_completion.lock().unwrap() = body;
    Json(json!({
        "choices": [{"message": {"role": "assistant", "content": "  Cells split in two.\n"}}],
        "usage": {"prompt_tokens": 40, "completion_tokens": 6, "total_tokens": 46}
    }))
}

async fn start_mock(mock: Arc<Mock>) -> SocketAddr {
    let app = Router::new()
        .route("/works", get(works))
        .route("/v1/chat/completions", post(completions))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn session(addr: SocketAddr, api_key: Option<&str>) -> Session {
    Session::new(
        CrossrefClient::new(SearchConfig::with_base_url(&format!("http://{addr}/works")).unwrap())
            .unwrap(),
        Summarizer::new(LlmConfig::new(&format!("http://{addr}/v1"), DEFAULT_MODEL).unwrap())
            .unwrap(),
        api_key.map(str::to_string),
    )
}

fn rna_seq_items() -> Value {
    json!({
        "status": "ok",
        "message": {
            "items": [
                {
                    "DOI": "10.1000/xyz123",
                    "title": ["RNA-seq reveals cell cycle genes"],
                    "author": [{"given": "Ada", "family": "Lovelace"}],
                    "container-title": ["Genome Biology"],
                    "published-print": {"date-parts": [[2018, 3]]},
                    "abstract": "<jats:p>Cells divide.</jats:p>"
                },
                {
                    "title": ["Untitled preprint follow-up"]
                }
            ]
        }
    })
}

#[tokio::test]
async fn rna_seq_search_renders_two_panels() {
    let mock = Arc::new(Mock::default());
    *mock.works.lock().unwrap() = rna_seq_items();
    let addr = start_mock(mock.clone()).await;

    let session = session(addr, Some("sk-test"));
    let criteria = SearchCriteria {
        start_year: Some(2015),
        end_year: Some(2020),
        ..SearchCriteria::new("RNA-seq")
    };
    let mut outcome = session.search(&criteria, 10).await;

    let query = mock.last_query.lock().unwrap().clone();
    assert_eq!(query["query"], "RNA-seq");
    assert_eq!(
        query["filter"],
        "type:journal-article,from-pub-date:2015-01-01,until-pub-date:2020-12-31"
    );
    assert_eq!(query["rows"], "10");
    assert_eq!(query["sort"], "relevance");

    assert_eq!(outcome.banner, Banner::Found(2));
    assert_eq!(outcome.panels.len(), 2);

    let first = &outcome.panels[0];
    assert_eq!(first.record.link, "https://doi.org/10.1000/xyz123");
    assert_eq!(first.record.abstract_text, "Cells divide.");
    assert_eq!(
        first.abstract_section,
        AbstractSection::Present {
            summary: SummarySlot::Pending
        }
    );

    let second = &outcome.panels[1];
    assert_eq!(second.record.link, "#");
    assert_eq!(second.abstract_section, AbstractSection::Missing);

    // Only the panel with an abstract triggers a completion
    assert_eq!(session.summarize_panels(&mut outcome).await, 1);
    assert_eq!(mock.completion_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        outcome.panels[0].abstract_section,
        AbstractSection::Present {
            summary: SummarySlot::Ready(Summary::Generated("Cells split in two.".to_string()))
        }
    );

    let text = render_outcome(&outcome);
    assert!(text.starts_with("[ok] Found 2 results\n"));
    assert!(text.contains("1. RNA-seq reveals cell cycle genes"));
    assert!(text.contains("Journal: Genome Biology (2018)"));
    assert!(text.contains("2. Untitled preprint follow-up"));
    assert!(text.contains("Link: #"));
    assert!(text.contains("No abstract available for this paper."));
}

#[tokio::test]
async fn completion_request_uses_fixed_prompt_and_parameters() {
    let mock = Arc::new(Mock::default());
    let addr = start_mock(mock.clone()).await;

    let summary = session(addr, Some("sk-test"))
        .summarize("Cells divide.")
        .await;
    assert_eq!(summary, Summary::Generated("Cells split in two.".to_string()));

    let body = mock.last_completion.lock().unwrap().clone();
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["temperature"], 0.5);
    assert_eq!(body["max_tokens"], 200);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "You are an expert in bioinformatics.");
    assert_eq!(
        body["messages"][1]["content"],
        "Summarize the following scientific abstract in simple terms:\n\nCells divide.\n\nSummary:"
    );
}

#[tokio::test]
async fn summarizer_makes_no_call_without_abstract_or_key() {
    let mock = Arc::new(Mock::default());
    let addr = start_mock(mock.clone()).await;

    let with_key = session(addr, Some("sk-test"));
    assert_eq!(
        with_key.summarize("").await.to_string(),
        "No abstract or API key provided."
    );

    let without_key = session(addr, None);
    assert_eq!(
        without_key.summarize("Cells divide.").await.to_string(),
        "No abstract or API key provided."
    );

    assert_eq!(mock.completion_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_key_session_shows_hint_and_skips_summaries() {
    let mock = Arc::new(Mock::default());
    *mock.works.lock().unwrap() = rna_seq_items();
    let addr = start_mock(mock.clone()).await;

    let session = session(addr, None);
    let mut outcome = session.search(&SearchCriteria::new("RNA-seq"), 10).await;
    assert_eq!(session.summarize_panels(&mut outcome).await, 0);
    assert_eq!(mock.completion_calls.load(Ordering::SeqCst), 0);

    let text = render_outcome(&outcome);
    assert!(text.contains("Enter your OpenAI API key to enable AI summaries."));
}

#[tokio::test]
async fn empty_result_set_is_not_an_error() {
    let mock = Arc::new(Mock::default());
    *mock.works.lock().unwrap() = json!({"message": {"items": []}});
    let addr = start_mock(mock).await;

    let outcome = session(addr, None)
        .search(&SearchCriteria::new("zzzz"), 10)
        .await;
    assert_eq!(
        outcome,
        SearchOutcome {
            banner: Banner::NoResults,
            panels: vec![]
        }
    );
}

#[tokio::test]
async fn search_failures_become_error_banner() {
    let mock = Arc::new(Mock::default());
    *mock.works.lock().unwrap() = json!({"message": "Internal error"});
    *mock.works_status.lock().unwrap() = Some(StatusCode::INTERNAL_SERVER_ERROR);
    let addr = start_mock(mock.clone()).await;

    let outcome = session(addr, None)
        .search(&SearchCriteria::new("RNA-seq"), 10)
        .await;
    assert!(outcome.panels.is_empty());
    match &outcome.banner {
        Banner::Error(message) => {
            assert!(message.starts_with("API error:"));
            assert!(message.contains("500"));
        }
        other => panic!("expected error banner, got {other:?}"),
    }

    // Well-formed status, wrong shape
    *mock.works_status.lock().unwrap() = None;
    *mock.works.lock().unwrap() = json!({"message": {"total-results": 0}});
    let outcome = session(addr, None)
        .search(&SearchCriteria::new("RNA-seq"), 10)
        .await;
    assert!(matches!(outcome.banner, Banner::Error(_)));
    assert!(outcome.panels.is_empty());
}

#[tokio::test]
async fn unreachable_search_service_becomes_error_banner() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = session(addr, None)
        .search(&SearchCriteria::new("RNA-seq"), 10)
        .await;
    assert!(matches!(outcome.banner, Banner::Error(_)));
}

#[tokio::test]
async fn completion_failure_is_reported_as_summary_text() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let summary = session(addr, Some("sk-bad")).summarize("Cells divide.").await;
    assert!(matches!(summary, Summary::Failed(_)));
    let text = summary.to_string();
    assert!(text.starts_with("⚠️ Error summarizing:"));
    assert!(text.contains("401"));
}

/// Server whose every route answers only after `delay`
async fn start_slow_server(delay: Duration) -> SocketAddr {
    let app = Router::new()
        .route(
            "/works",
            get(move || async move {
                tokio::time::sleep(delay).await;
                Json(json!({"message": {"items": []}}))
            }),
        )
        .route(
            "/v1/chat/completions",
            post(move || async move {
                tokio::time::sleep(delay).await;
                Json(json!({"choices": [{"message": {"content": "late"}}]}))
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn session_with_timeout(addr: SocketAddr, timeout: Duration) -> Session {
    let mut search_config = SearchConfig::with_base_url(&format!("http://{addr}/works")).unwrap();
    search_config.timeout = timeout;
    let mut llm_config = LlmConfig::new(&format!("http://{addr}/v1"), DEFAULT_MODEL).unwrap();
    llm_config.timeout = timeout;
    Session::new(
        CrossrefClient::new(search_config).unwrap(),
        Summarizer::new(llm_config).unwrap(),
        Some("sk-test".to_string()),
    )
}

#[tokio::test]
async fn slow_completion_times_out_as_failed_summary() {
    let addr = start_slow_server(Duration::from_secs(5)).await;
    let session = session_with_timeout(addr, Duration::from_millis(200));

    let started = Instant::now();
    let summary = session.summarize("Cells divide.").await;
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(matches!(summary, Summary::Failed(_)));
    assert!(summary.to_string().starts_with("⚠️ Error summarizing:"));
}

#[tokio::test]
async fn slow_search_times_out_as_error_banner() {
    let addr = start_slow_server(Duration::from_secs(5)).await;
    let session = session_with_timeout(addr, Duration::from_millis(200));

    let started = Instant::now();
    let outcome = session.search(&SearchCriteria::new("RNA-seq"), 10).await;
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(matches!(outcome.banner, Banner::Error(_)));
    assert!(outcome.panels.is_empty());
}
