use reqwest::header::HeaderMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

use super::InferenceError;

pub(crate) const BASE_DELAY: Duration = Duration::from_secs(2);
pub(crate) const MAX_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(timeout: Duration, max_retries: usize) -> Self {
        Self {
            timeout,
            max_retries,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
        }
    }
}

pub(crate) fn is_transient(status: u16, body: &str) -> bool {
    if matches!(status, 429 | 502 | 503 | 504 | 529) {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("too many requests")
        || lower.contains("is currently loading")
        || lower.contains("overloaded")
}

pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<u64>().ok().map(Duration::from_secs)
}

/// Runs `call` under the policy's per-attempt timeout, retrying transient
/// failures with exponential backoff.
pub(crate) async fn call_with_retry<F, Fut>(
    policy: &RetryPolicy,
    model: &str,
    mut call: F,
) -> Result<String, InferenceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, InferenceError>>,
{
    let mut delay = policy.base_delay;
    let mut attempt = 0usize;
    loop {
        let result = match timeout(policy.timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout {
                model: model.to_string(),
                secs: policy.timeout.as_secs(),
            }),
        };
        match result {
            Ok(text) => return Ok(text),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                let mut wait = delay;
                if let Some(requested) = err.retry_after()
                    && requested > wait
                {
                    wait = requested.min(policy.max_delay);
                }
                warn!(
                    "{}; retrying in {:.1}s (attempt {}/{})",
                    err,
                    wait.as_secs_f32(),
                    attempt,
                    policy.max_retries
                );
                sleep(wait).await;
                delay = next_delay(delay, policy);
            }
            Err(err) => return Err(err),
        }
    }
}

fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    let next = current.saturating_mul(2).max(policy.base_delay);
    next.min(policy.max_delay)
}
