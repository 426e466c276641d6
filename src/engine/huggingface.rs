use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::retry::{RetryPolicy, call_with_retry, retry_after};
use super::{EngineFuture, InferenceError, TranslationEngine};
use crate::settings::Settings;

const MAX_ERROR_BODY: usize = 512;

/// Client for a Hugging Face style inference endpoint serving translation
/// pipelines (`POST {base_url}/{model}` with `{"inputs": text}`).
#[derive(Debug, Clone)]
pub struct HuggingFaceEngine {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    policy: RetryPolicy,
}

impl HuggingFaceEngine {
    pub fn new(base_url: impl Into<String>, token: Option<String>, policy: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            policy,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let token = std::env::var(&settings.engine_api_key_env)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let policy = RetryPolicy::new(
            Duration::from_secs(settings.engine_timeout_secs),
            settings.engine_max_retries,
        );
        Self::new(settings.engine_base_url.clone(), token, policy)
    }

    async fn request(&self, model: &str, text: &str) -> Result<String, InferenceError> {
        let url = format!("{}/{}", self.base_url, model);
        debug!("calling {} with {} chars", url, text.chars().count());
        let mut request = self.client.post(&url).json(&json!({ "inputs": text }));
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|err| InferenceError::Request {
            model: model.to_string(),
            message: err.to_string(),
        })?;
        let status = response.status();
        let retry_after = retry_after(response.headers());
        let body = response.text().await.map_err(|err| InferenceError::Request {
            model: model.to_string(),
            message: err.to_string(),
        })?;
        if !status.is_success() {
            return Err(InferenceError::Status {
                model: model.to_string(),
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
                retry_after,
            });
        }
        parse_translation(&body, model)
    }
}

impl TranslationEngine for HuggingFaceEngine {
    fn translate(&self, model: &str, text: &str) -> EngineFuture {
        let engine = self.clone();
        let model = model.to_string();
        let text = text.to_string();
        Box::pin(async move {
            call_with_retry(&engine.policy, &model, || engine.request(&model, &text)).await
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranslationPayload {
    Many(Vec<TranslationOutput>),
    One(TranslationOutput),
}

#[derive(Debug, Deserialize)]
struct TranslationOutput {
    translation_text: String,
}

fn parse_translation(body: &str, model: &str) -> Result<String, InferenceError> {
    let payload: TranslationPayload =
        serde_json::from_str(body).map_err(|err| InferenceError::Response {
            model: model.to_string(),
            message: format!("{} ({})", err, truncate(body, MAX_ERROR_BODY)),
        })?;
    let output = match payload {
        TranslationPayload::One(output) => Some(output),
        TranslationPayload::Many(outputs) => outputs.into_iter().next(),
    };
    output
        .map(|output| output.translation_text)
        .ok_or_else(|| InferenceError::Response {
            model: model.to_string(),
            message: "empty translation list".to_string(),
        })
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out = value.chars().take(max_chars).collect::<String>();
    out.push('…');
    out
}
