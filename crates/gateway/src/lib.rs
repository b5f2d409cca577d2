//! HTTP gateway for Eco.
//!
//! Exposes prompt assembly over REST:
//! - `GET /health`
//! - `GET /v1/prompt/preview`: assemble an empty request
//! - `POST /v1/prompt`: assemble the request in the body
//!
//! Built on Axum. Assembly runs in its own task so a panic inside the
//! pipeline turns into a 500 instead of a dropped connection.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use eco_assembler::ContextBuilder;
use eco_config::AppConfig;
use eco_core::AssemblyRequest;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub builder: Arc<ContextBuilder>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(builder: Arc<ContextBuilder>) -> Router {
    let state = Arc::new(GatewayState { builder });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/prompt/preview", get(preview_handler))
        .route("/v1/prompt", post(prompt_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(
    config: &AppConfig,
    builder: Arc<ContextBuilder>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(builder);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct PromptResponse {
    prompt: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type PromptResult = Result<Json<PromptResponse>, (StatusCode, Json<ErrorResponse>)>;

async fn preview_handler(State(state): State<SharedState>) -> PromptResult {
    assemble(state, AssemblyRequest::default()).await
}

async fn prompt_handler(
    State(state): State<SharedState>,
    Json(request): Json<AssemblyRequest>,
) -> PromptResult {
    info!(
        message_len = request.input().len(),
        has_user = request.user().is_some(),
        "Prompt request received"
    );
    assemble(state, request).await
}

async fn assemble(state: SharedState, request: AssemblyRequest) -> PromptResult {
    let builder = state.builder.clone();
    let task = tokio::spawn(async move { builder.assemble(&request).await });

    match task.await {
        Ok(prompt) => Ok(Json(PromptResponse { prompt })),
        Err(e) => {
            error!(error = %e, "Prompt assembly task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to assemble the prompt".into(),
                }),
            ))
        }
    }
}
