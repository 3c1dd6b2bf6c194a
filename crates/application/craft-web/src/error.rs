//! API errors with HTTP status mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use craft_resolver::ResolveError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Missing element1 or element2")]
    MissingParameter,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Invalid query: {0}")]
    BadQuery(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter | Self::BadQuery(_) => StatusCode::BAD_REQUEST,
            Self::Resolve(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Resolve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "rejected request");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
