use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::ServeArgs;
use crate::core::reference::{ExternalCandidate, NerSpan, ResolvedReference};
use crate::matching::engine::ReferenceEngine;
use crate::matching::resolver::ResolutionCounts;
use crate::parsing::external::parse_response;

/// Limits on request content to prevent `DoS` attacks
pub const MAX_TEXT_BYTES: usize = 1024 * 1024; // 1MB
pub const MAX_CANDIDATES: usize = 10_000;
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024; // 4MB

/// Shared application state
pub struct AppState {
    pub engine: Arc<ReferenceEngine>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
}

#[derive(Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct NormalizeRequest {
    /// Structured candidates
    #[serde(default)]
    pub candidates: Vec<ExternalCandidate>,

    /// Raw extractor output, parsed leniently and appended to `candidates`
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ExtractResponse {
    pub references: Vec<ResolvedReference>,
    pub stats: ResolutionCounts,
}

#[derive(Serialize, Deserialize)]
pub struct SpansResponse {
    pub spans: Vec<NerSpan>,
}

#[derive(Serialize, Deserialize)]
pub struct NormalizeResponse {
    pub references: Vec<ResolvedReference>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build an error response; internal details are logged, never returned
fn error_response(status: StatusCode, error_type: &str, message: &str) -> ApiError {
    if status.is_server_error() {
        tracing::error!("{}: {}", error_type, message);
    } else {
        tracing::debug!("Rejected request ({}): {}", error_type, message);
    }
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
            error_type: error_type.to_string(),
        }),
    )
}

fn bad_json(rejection: &JsonRejection) -> ApiError {
    error_response(rejection.status(), "invalid_request", &rejection.body_text())
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the engine cannot be built, the tokio runtime cannot be
/// created, or the server fails to start.
pub fn run(args: ServeArgs, verbose: bool) -> anyhow::Result<()> {
    let engine = Arc::new(args.engine.build_engine(verbose)?);
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(&args, engine).await })
}

/// Create the application router with routes, security headers, timeout,
/// concurrency and body-size limits.
///
/// Rate limiting is added separately by [`create_rate_limited_router`] because
/// it keys on the peer address, which only a real listener provides.
pub fn create_router(engine: Arc<ReferenceEngine>) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        .route("/api/extract", post(extract_handler))
        .route("/api/spans", post(spans_handler))
        .route("/api/normalize", post(normalize_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/stats", get(stats_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                .layer(ConcurrencyLimitLayer::new(100))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}

/// [`create_router`] plus IP-based rate limiting
///
/// # Errors
///
/// Returns an error if the rate limit configuration is rejected.
pub fn create_rate_limited_router(engine: Arc<ReferenceEngine>) -> anyhow::Result<Router> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    Ok(create_router(engine).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

async fn run_server(args: &ServeArgs, engine: Arc<ReferenceEngine>) -> anyhow::Result<()> {
    let app = create_rate_limited_router(engine)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting scripture-ref API at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn extract_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_json(&e))?;
    check_text(&request.text)?;

    let references = state.engine.extract(&request.text);
    Ok(Json(ExtractResponse {
        references,
        stats: state.engine.stats(),
    }))
}

async fn spans_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<SpansResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_json(&e))?;
    check_text(&request.text)?;

    Ok(Json(SpansResponse {
        spans: state.engine.extract_spans(&request.text),
    }))
}

async fn normalize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NormalizeRequest>, JsonRejection>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_json(&e))?;

    let mut candidates = request.candidates;
    if let Some(response) = &request.response {
        check_text(response)?;
        candidates.extend(parse_response(response));
    }

    if candidates.len() > MAX_CANDIDATES {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "too_many_candidates",
            &format!("At most {MAX_CANDIDATES} candidates are accepted per request"),
        ));
    }

    Ok(Json(NormalizeResponse {
        references: state.engine.normalize(&candidates),
    }))
}

/// Return the books in the catalog
async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let books: Vec<serde_json::Value> = state
        .engine
        .catalog()
        .books()
        .iter()
        .map(|b| {
            serde_json::json!({
                "id": b.id(),
                "canonical_name": b.canonical_name(),
                "testament": b.testament(),
                "chapter_count": b.chapter_count(),
                "aliases": b.aliases(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": books.len(),
        "books": books,
    }))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.engine.stats()).into_response()
}

fn check_text(text: &str) -> Result<(), ApiError> {
    if text.len() > MAX_TEXT_BYTES {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "text_too_large",
            &format!("Text exceeds {MAX_TEXT_BYTES} bytes"),
        ));
    }
    Ok(())
}
