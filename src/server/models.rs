use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::document::DocumentError;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LanguagesResponse {
    pub(crate) languages: Vec<String>,
    pub(crate) pairs: Vec<PairInfo>,
    pub(crate) routes: Vec<RouteInfo>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PairInfo {
    pub(crate) source: String,
    pub(crate) target: String,
    pub(crate) model: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RouteInfo {
    pub(crate) source: String,
    pub(crate) targets: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DocumentError> for ServerError {
    fn from(err: DocumentError) -> Self {
        let status = match &err {
            DocumentError::UnsupportedFormat(_)
            | DocumentError::EmptyExtraction
            | DocumentError::UnsupportedLanguage(_)
            | DocumentError::NoTranslationPath { .. } => StatusCode::BAD_REQUEST,
            DocumentError::Inference(_) => StatusCode::BAD_GATEWAY,
            DocumentError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("translate failed: {:#}", err);
        } else {
            warn!("translate rejected: {}", err);
        }
        // Faults carry their context chain so the cause reaches the caller.
        let message = match &err {
            DocumentError::Unexpected(inner) => format!("{:#}", inner),
            _ => err.to_string(),
        };
        Self { status, message }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
