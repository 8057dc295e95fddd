use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use corpusvec_core::CorpusConfig;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{router, AppState};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_corpus(dir: &Path) {
    fs::write(dir.join("doc1.txt"), "Fraud in the road project. Fraud again.").unwrap();
    fs::write(dir.join("doc2.txt"), "The road project finished on time.").unwrap();
}

fn app(dir: &Path, admin_token: Option<&str>) -> Router {
    let state = AppState::new(CorpusConfig::new(dir), admin_token.map(str::to_string)).unwrap();
    router(state)
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Bytes) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn stats_report_corpus_size() {
    let dir = tempdir().unwrap();
    build_tiny_corpus(dir.path());

    let (status, body) = get(app(dir.path(), None), "/stats").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["documents"], 2);
    assert_eq!(json["terms"], 9);
}

#[tokio::test]
async fn term_lookup_reports_document_frequency() {
    let dir = tempdir().unwrap();
    build_tiny_corpus(dir.path());
    let app = app(dir.path(), None);

    let (status, body) = get(app.clone(), "/term/Fraud").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["index"], 1);
    assert_eq!(json["document_frequency"], 1);
    let idf = json["idf"].as_f64().unwrap();
    assert!((idf - 2f64.ln()).abs() < 1e-9);

    let (status, body) = get(app.clone(), "/terms/1").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["term"], "fraud");

    let (status, _) = get(app, "/term/bribe").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vectorize_weighs_known_terms() {
    let dir = tempdir().unwrap();
    build_tiny_corpus(dir.path());

    let req = Request::post("/vectorize").body(Body::from("fraud fraud road\r\nunknown words")).unwrap();
    let (status, body) = call(app(dir.path(), None), req).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["items"], 2);

    let vector = json["vector"].as_array().unwrap();
    assert_eq!(vector[0]["term"], "fraud");
    assert_eq!(vector[0]["frequency"], 2);
    assert_eq!(vector[0]["tf"], 1.0);
    assert!(vector[0]["tf_idf"].as_f64().unwrap() > 0.0);
    // "road" is in both documents, so its idf is zero.
    assert_eq!(vector[1]["term"], "road");
    assert_eq!(vector[1]["tf_idf"], 0.0);
}

#[tokio::test]
async fn rebuild_requires_admin_token() {
    let dir = tempdir().unwrap();
    build_tiny_corpus(dir.path());

    let req = Request::post("/index/rebuild").body(Body::empty()).unwrap();
    let (status, _) = call(app(dir.path(), None), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::post("/index/rebuild").header("X-ADMIN-TOKEN", "wrong").body(Body::empty()).unwrap();
    let (status, _) = call(app(dir.path(), Some("secret")), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rebuild_picks_up_new_documents() {
    let dir = tempdir().unwrap();
    build_tiny_corpus(dir.path());
    let app = app(dir.path(), Some("secret"));

    fs::write(dir.path().join("doc3.txt"), "bribe").unwrap();
    let req = Request::post("/index/rebuild").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, body) = call(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["documents"], 3);

    let (status, _) = get(app, "/term/bribe").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn vectorize_accepts_non_utf8_bodies() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("berita.txt"), "korupsi caf kopi").unwrap();

    // Latin-1 "café": 0xE9 is not valid UTF-8 on its own and acts as a separator.
    let req = Request::post("/vectorize").body(Body::from(b"korupsi caf\xe9".to_vec())).unwrap();
    let (status, body) = call(app(dir.path(), None), req).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["items"], 2);
    let terms: Vec<&str> = json["vector"].as_array().unwrap().iter().filter_map(|v| v["term"].as_str()).collect();
    assert_eq!(terms, vec!["korupsi", "caf"]);
}
