//! HTTP Endpoints
//!
//! REST API for the banking assistant.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use nano_agent::AgentResponse;

use crate::metrics::{metrics_handler, record_chat_request, record_session_created, record_verification};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        // Chat endpoint
        .route("/api/chat", post(chat))
        // Session endpoints
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/sessions/:id/summary", get(session_summary))
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins.
///
/// - If cors_enabled is false, returns a permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        if !origins.is_empty() {
            tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        } else {
            tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        }
        return match "http://localhost:3000".parse::<HeaderValue>() {
            Ok(localhost) => CorsLayer::new()
                .allow_origin(localhost)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
            Err(_) => CorsLayer::new(),
        };
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// Chat endpoint. Creates a session when none is supplied.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<AgentResponse>, ServerError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ServerError::InvalidRequest("message must not be empty".into()));
    }
    if message.chars().count() > state.settings.server.max_message_chars {
        return Err(ServerError::InvalidRequest(format!(
            "message exceeds {} characters",
            state.settings.server.max_message_chars
        )));
    }

    let session_id = match request.session_id {
        Some(id) => {
            if Uuid::parse_str(&id).is_err() {
                return Err(ServerError::InvalidRequest("invalid session id".into()));
            }
            id
        }
        None => {
            let session = state.sessions.create(None).await?;
            record_session_created();
            session.session_id
        }
    };

    let response = state.agent.process_message(&session_id, message).await;
    record_chat_request();
    if response
        .tools_used
        .iter()
        .any(|tool| tool == "verify_customer_identity")
    {
        record_verification(response.verified == Some(true));
    }

    Ok(Json(response))
}

/// Create a new session
async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let session = state.sessions.create(None).await?;
    record_session_created();

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "session_id": session.session_id,
            "created_at": session.created_at,
            "status": session.status,
        })),
    ))
}

/// Get session metadata
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let session = state
        .sessions
        .get(&id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(serde_json::json!({
        "session_id": session.session_id,
        "customer_id": session.customer_id,
        "verified": session.is_verified(),
        "status": session.status,
        "created_at": session.created_at,
        "last_activity": session.last_activity,
    })))
}

/// Terminate a session
async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.sessions.terminate(&id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(nano_store::StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Audit-derived session summary
async fn session_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let session = state
        .sessions
        .get(&id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let summary = state
        .agent
        .support()
        .session_summary(&id, session.customer_id.as_deref())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(serde_json::json!({ "summary": summary })))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ready",
        "bank": state.settings.banking.bank_name,
    }))
}
