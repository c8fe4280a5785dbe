//! HTTP API tests
//!
//! Drive the router in-process with `oneshot`, covering every endpoint,
//! error bodies, request size limits and the security headers.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use scripture_ref::web::server::{create_router, MAX_CANDIDATES, MAX_TEXT_BYTES};
use scripture_ref::{BookCatalog, ReferenceEngine};

fn router() -> Router {
    let catalog = Arc::new(BookCatalog::load_embedded().unwrap());
    create_router(Arc::new(ReferenceEngine::new(catalog).unwrap()))
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_extract_endpoint() {
    let request = post_json(
        "/api/extract",
        json!({"text": "Sudah baca Kej 1-3, besok Mat 29"}).to_string(),
    );
    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::OK);
    let references = body["references"].as_array().unwrap();
    assert_eq!(references.len(), 2);
    assert_eq!(references[0]["normalized_text"], "Kejadian 1-3");
    assert_eq!(references[0]["is_valid"], true);
    assert_eq!(references[0]["source"], "RULE");
    assert_eq!(references[1]["book_id"], "MAT");
    assert_eq!(references[1]["is_valid"], false);
    assert_eq!(body["stats"]["exact"], 2);
}

#[tokio::test]
async fn test_spans_endpoint() {
    let request = post_json("/api/spans", json!({"text": "Mat 5 sampai 7"}).to_string());
    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["spans"],
        json!([
            {"start": 0, "end": 3, "label": "BOOK", "text": "Mat"},
            {"start": 4, "end": 14, "label": "CHAPTER", "text": "5 sampai 7"},
        ])
    );
}

#[tokio::test]
async fn test_normalize_endpoint_candidates_and_raw_response() {
    let request = post_json(
        "/api/normalize",
        json!({
            "candidates": [
                {"book_text": "Kejadian", "start_chapter": 1, "end_chapter": 3, "confidence": 0.5, "source": "gpt"},
                {"book_text": "Xyzzy", "start_chapter": 1, "end_chapter": 1},
            ],
            "response": "```json\n[{\"book_text\": \"Mat\", \"start_chapter\": 5, \"end_chapter\": 7}]\n```",
        })
        .to_string(),
    );
    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::OK);
    let references = body["references"].as_array().unwrap();
    assert_eq!(references.len(), 2, "unresolvable book is dropped: {body}");

    assert_eq!(references[0]["normalized_text"], "Kejadian 1-3");
    assert_eq!(references[0]["source"], "EXTERNAL");
    assert_eq!(references[0]["source_label"], "gpt");
    assert_eq!(references[0]["confidence"], 1.0);
    assert_eq!(references[0]["candidate_confidence"], 0.5);

    assert_eq!(references[1]["normalized_text"], "Matius 5-7");
    assert_eq!(references[1]["source_label"], "llm");
}

#[tokio::test]
async fn test_catalog_endpoint() {
    let (status, body) = send(router(), get("/api/catalog")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 66);
    assert_eq!(body["books"][0]["id"], "GEN");
    assert_eq!(body["books"][0]["chapter_count"], 50);
    assert_eq!(body["books"][0]["testament"], "old");
}

#[tokio::test]
async fn test_stats_endpoint_tracks_resolutions() {
    let app = router();

    let request = post_json("/api/extract", json!({"text": "Kej 1 dan Xyz 5"}).to_string());
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exact"], 1);
    assert_eq!(body["failed"], 1);
}

#[tokio::test]
async fn test_malformed_json_returns_error_body() {
    let request = post_json("/api/extract", "{not json".to_string());
    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_missing_field_is_rejected() {
    let request = post_json("/api/spans", json!({"message": "Kej 1"}).to_string());
    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_oversized_text_is_rejected() {
    let text = "a".repeat(MAX_TEXT_BYTES + 1);
    let request = post_json("/api/extract", json!({ "text": text }).to_string());
    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error_type"], "text_too_large");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let text = "a".repeat(5 * 1024 * 1024);
    let request = post_json("/api/spans", json!({ "text": text }).to_string());
    let (status, _) = send(router(), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_too_many_candidates_is_rejected() {
    let candidate = json!({"book_text": "Kej", "start_chapter": 1, "end_chapter": 1});
    let candidates = vec![candidate; MAX_CANDIDATES + 1];
    let request = post_json("/api/normalize", json!({ "candidates": candidates }).to_string());
    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error_type"], "too_many_candidates");
}

#[tokio::test]
async fn test_security_headers_present() {
    let response = router().oneshot(get("/api/stats")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "no-referrer");
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = send(router(), get("/api/verses")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
