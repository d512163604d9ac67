//! Inspector error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Inspector error types
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Scope not found: {0}")]
    ScopeNotFound(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            HttpError::ScopeNotFound(_) => (StatusCode::NOT_FOUND, "scope_not_found"),
            HttpError::ServiceNotFound(_) => (StatusCode::NOT_FOUND, "service_not_found"),
            HttpError::Template(_) => (StatusCode::INTERNAL_SERVER_ERROR, "template_error"),
            HttpError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "render_error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "inspector request failed");
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for inspector handlers
pub type HttpResult<T> = Result<T, HttpError>;
