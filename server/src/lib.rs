use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sift_core::{DocId, EngineStats, NewDocument, SearchEngine};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Longest snippet returned per hit, in characters.
const SNIPPET_CHARS: usize = 200;
/// Characters kept before the first matched term.
const SNIPPET_LEAD: usize = 100;
const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AddResponse {
    pub doc_ids: Vec<DocId>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub admin_token: Option<String>,
}

/// Router over a shared engine. Ingestion routes require `admin_token`;
/// with no token configured they always answer 401.
pub fn build_app(engine: Arc<SearchEngine>, admin_token: Option<String>) -> Router {
    let app_state = AppState { engine, admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/documents", post(add_document))
        .route("/index/batch", post(index_batch))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, MAX_K);
    let hits = state.engine.search(&params.q, k);

    // Capture raw query terms for highlighting
    let raw_terms: Vec<String> = params.q.split_whitespace().map(|s| s.to_string()).collect();
    let results: Vec<SearchHit> = hits
        .into_iter()
        .map(|hit| SearchHit {
            doc_id: hit.id,
            score: hit.score,
            snippet: snippet(&hit.content, &raw_terms),
            url: hit.url,
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, hits = results.len(), took_s = elapsed.as_secs_f64(), "search");
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: results.len(), results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match state.engine.document(doc_id) {
        Some(doc) => Ok(Json(serde_json::json!({
            "doc_id": doc.id,
            "url": doc.url,
            "text": doc.content,
        }))),
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.stats())
}

async fn add_document(State(state): State<AppState>, headers: HeaderMap, Json(doc): Json<NewDocument>) -> Result<Json<AddResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let id = state.engine.add_document(doc).map_err(store_error)?;
    tracing::info!(doc_id = id, "document ingested");
    Ok(Json(AddResponse { doc_ids: vec![id] }))
}

async fn index_batch(State(state): State<AppState>, headers: HeaderMap, Json(docs): Json<Vec<NewDocument>>) -> Result<Json<AddResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let doc_ids = state.engine.add_documents(docs).map_err(store_error)?;
    tracing::info!(count = doc_ids.len(), "batch ingested");
    Ok(Json(AddResponse { doc_ids }))
}

fn store_error(err: sift_core::Error) -> (StatusCode, String) {
    tracing::error!(error = %err, "ingestion refused");
    (StatusCode::INSUFFICIENT_STORAGE, err.to_string())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

/// Window of the text around the first case-insensitive match of any raw
/// term, with every term wrapped in `<em>`.
pub fn snippet(text: &str, raw_terms: &[String]) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let first_idx = raw_terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .find_map(|t| find_case_insensitive(text, t));
    let window: String = match first_idx {
        Some(char_idx) => text.chars().skip(char_idx.saturating_sub(SNIPPET_LEAD)).take(SNIPPET_CHARS).collect(),
        None => text.chars().take(SNIPPET_CHARS).collect(),
    };
    Some(highlight_terms(&window, raw_terms))
}

/// Character offset of the first case-insensitive occurrence of `needle`.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let pat = regex::RegexBuilder::new(&regex::escape(needle)).case_insensitive(true).build().ok()?;
    let m = pat.find(haystack)?;
    Some(haystack[..m.start()].chars().count())
}

fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    let mut s = snippet.to_string();
    for t in terms {
        if t.trim().is_empty() { continue; }
        let Ok(pat) = regex::RegexBuilder::new(&regex::escape(t)).case_insensitive(true).build() else {
            continue;
        };
        s = pat.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}
