//! NANO Banking Assistant Server
//!
//! HTTP endpoints for the banking assistant.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{
    init_metrics, record_chat_request, record_session_created, record_sessions_expired,
    record_verification,
};
pub use state::AppState;

use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Session(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status = axum::http::StatusCode::from(self);
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<nano_store::StoreError> for ServerError {
    fn from(err: nano_store::StoreError) -> Self {
        ServerError::from(nano_core::Error::from(err))
    }
}

impl From<nano_core::Error> for ServerError {
    fn from(err: nano_core::Error) -> Self {
        match err {
            nano_core::Error::NotFound(what) => ServerError::Session(what),
            nano_core::Error::Validation(why) => ServerError::InvalidRequest(why),
            other => ServerError::Internal(other.to_string()),
        }
    }
}
