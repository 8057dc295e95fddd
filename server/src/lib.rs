use anyhow::Result;
use axum::{body::Bytes, extract::{Path, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use corpusvec_core::{normalize_line_endings, Corpus, CorpusConfig, DictionaryEntry, DocumentVector};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

#[derive(Serialize)]
pub struct StatsResponse {
    pub source: String,
    pub documents: u32,
    pub terms: usize,
}

#[derive(Serialize)]
pub struct TermResponse {
    pub index: u32,
    pub term: String,
    pub document_frequency: u32,
    /// `ln(documents / document_frequency)`; absent for terms in no document.
    pub idf: Option<f64>,
}

#[derive(Serialize)]
pub struct VectorItem {
    pub index: u32,
    pub term: String,
    pub frequency: u32,
    pub tf: f64,
    pub tf_idf: Option<f64>,
}

#[derive(Serialize)]
pub struct VectorizeResponse {
    pub items: usize,
    pub took_s: f64,
    pub vector: Vec<VectorItem>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: CorpusConfig,
    pub corpus: Arc<RwLock<Arc<Corpus>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Build the corpus described by `config`; requests only read it afterwards.
    pub fn new(config: CorpusConfig, admin_token: Option<String>) -> Result<Self> {
        let corpus = Corpus::build(&config)?;
        tracing::info!(
            documents = corpus.document_count(),
            terms = corpus.dictionary().term_count(),
            "corpus loaded"
        );
        Ok(Self { config, corpus: Arc::new(RwLock::new(Arc::new(corpus))), admin_token })
    }

    fn corpus(&self) -> Arc<Corpus> {
        self.corpus.read().clone()
    }
}

pub fn build_app(config: CorpusConfig) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState::new(config, admin_token)?;

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

    Ok(router(app_state).layer(cors).layer(TraceLayer::new_for_http()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/stats", get(stats_handler))
        .route("/term/:term", get(term_handler))
        .route("/terms/:index", get(term_by_index_handler))
        .route("/vectorize", post(vectorize_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(state)
}

/// `ln(documents / df)`, or `None` when the term occurs in no document.
pub fn idf(documents: u32, document_frequency: u32) -> Option<f64> {
    (document_frequency > 0 && documents > 0).then(|| (f64::from(documents) / f64::from(document_frequency)).ln())
}

fn term_response(corpus: &Corpus, entry: &DictionaryEntry) -> TermResponse {
    TermResponse {
        index: entry.index(),
        term: entry.term().to_string(),
        document_frequency: entry.document_frequency(),
        idf: idf(corpus.document_count(), entry.document_frequency()),
    }
}

/// TF-IDF weights of `vector`, with `tf = frequency / item_count`.
pub fn weigh(corpus: &Corpus, vector: &DocumentVector) -> Vec<VectorItem> {
    let item_count = vector.item_count().max(1) as f64;
    vector
        .iter()
        .map(|item| {
            let tf = f64::from(item.frequency()) / item_count;
            let df = corpus
                .dictionary()
                .get_by_index(item.term_index())
                .map_or(0, DictionaryEntry::document_frequency);
            VectorItem {
                index: item.term_index(),
                term: item.term().to_string(),
                frequency: item.frequency(),
                tf,
                tf_idf: idf(corpus.document_count(), df).map(|idf| tf * idf),
            }
        })
        .collect()
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let corpus = state.corpus();
    let dictionary = corpus.dictionary();
    Json(StatsResponse {
        source: dictionary.source().to_string(),
        documents: dictionary.document_count(),
        terms: dictionary.term_count(),
    })
}

pub async fn term_handler(State(state): State<AppState>, Path(term): Path<String>) -> Result<Json<TermResponse>, ApiError> {
    let corpus = state.corpus();
    let entry = corpus
        .dictionary()
        .get(&term.to_ascii_lowercase())
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("term {term:?} is not indexed")))?;
    Ok(Json(term_response(&corpus, entry)))
}

pub async fn term_by_index_handler(State(state): State<AppState>, Path(index): Path<u32>) -> Result<Json<TermResponse>, ApiError> {
    let corpus = state.corpus();
    let entry = corpus
        .dictionary()
        .get_by_index(index)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no term with index {index}")))?;
    Ok(Json(term_response(&corpus, entry)))
}

/// The body is taken as raw bytes; only ASCII alphanumerics matter to the tokenizer.
pub async fn vectorize_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<VectorizeResponse>, ApiError> {
    let start = std::time::Instant::now();
    let corpus = state.corpus();
    // A bare '\r' terminates the buffer; CRLF line endings should not.
    let text = normalize_line_endings(&body);
    let vector = corpus
        .vectorize(&text)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let weights = weigh(&corpus, &vector);
    Ok(Json(VectorizeResponse { items: vector.item_count(), took_s: start.elapsed().as_secs_f64(), vector: weights }))
}

async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<StatsResponse>, ApiError> {
    authorize(&state, &headers)?;
    let config = state.config.clone();
    let corpus = tokio::task::spawn_blocking(move || Corpus::build(&config))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("rebuild failed: {e}")))?;
    let stats = StatsResponse {
        source: corpus.dictionary().source().to_string(),
        documents: corpus.document_count(),
        terms: corpus.dictionary().term_count(),
    };
    *state.corpus.write() = Arc::new(corpus);
    tracing::info!(documents = stats.documents, terms = stats.terms, "corpus rebuilt");
    Ok(Json(stats))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
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
