use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

mod huggingface;
mod retry;

pub use huggingface::HuggingFaceEngine;
pub use retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model {model} timed out after {secs}s")]
    Timeout { model: String, secs: u64 },

    #[error("request to model {model} failed: {message}")]
    Request { model: String, message: String },

    #[error("model {model} returned status {status}: {body}")]
    Status {
        model: String,
        status: u16,
        body: String,
        retry_after: Option<Duration>,
    },

    #[error("model {model} returned an unexpected response: {message}")]
    Response { model: String, message: String },
}

impl InferenceError {
    /// Whether a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            InferenceError::Timeout { .. } | InferenceError::Request { .. } => true,
            InferenceError::Status { status, body, .. } => retry::is_transient(*status, body),
            InferenceError::Response { .. } => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            InferenceError::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

pub type EngineFuture = Pin<Box<dyn Future<Output = Result<String, InferenceError>> + Send>>;

/// Executes one pretrained translation model on one piece of text.
pub trait TranslationEngine: Clone + Send + Sync {
    fn translate(&self, model: &str, text: &str) -> EngineFuture;
}
