use crate::services::CompletionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service_core::error::AppError;
use thiserror::Error;

/// Failures of the diagnose operation as seen by the browser client.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    /// The completion API answered with a non-success status; its body is
    /// relayed for troubleshooting.
    #[error("completion API returned status {status}")]
    Upstream { status: u16, body: String },

    /// Anything that failed on our side of the wire.
    #[error("{0}")]
    Local(String),

    #[error(transparent)]
    Infrastructure(#[from] AppError),
}

impl From<CompletionError> for DiagnosisError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Upstream { status, body } => DiagnosisError::Upstream { status, body },
            other => DiagnosisError::Local(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: &'static str,
    detail: String,
}

impl IntoResponse for DiagnosisError {
    fn into_response(self) -> Response {
        let envelope = match self {
            DiagnosisError::Upstream { body, .. } => ErrorEnvelope {
                error: "OpenAI error",
                detail: body,
            },
            DiagnosisError::Local(detail) => ErrorEnvelope {
                error: "Server error",
                detail,
            },
            DiagnosisError::Infrastructure(err) => return err.into_response(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
    }
}
