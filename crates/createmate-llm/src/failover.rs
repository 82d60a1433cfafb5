use crate::backends::LlmBackend;
use async_trait::async_trait;
use createmate_core::{CreateMateError, CreateMateResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[cfg(test)]
type SleepFn = Box<
    dyn Fn(u64) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> + Send + Sync,
>;

/// Retry behaviour for a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries per backend before moving to the next one.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Cap for the exponential backoff.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_max_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

/// Whether an error is transient and worth retrying.
///
/// Rate limits (429), auth failures (401), timeouts and server errors retry.
/// A 400 never does.
pub fn is_retryable(err: &CreateMateError) -> bool {
    let lower = err.to_string().to_lowercase();

    if lower.contains("400") {
        return false;
    }

    lower.contains("429")
        || lower.contains("401")
        || lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("5xx")
        || lower.contains("500")
        || lower.contains("502")
        || lower.contains("503")
        || lower.contains("504")
}

pub(crate) fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> u64 {
    let delay = policy
        .backoff_base_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    delay.min(policy.backoff_max_ms)
}

/// Wraps several backends and fails over between them with backoff retries.
///
/// Backends are tried in order. Transient errors are retried up to
/// `max_retries` times on the same backend; anything else moves straight to
/// the next one. When every backend fails the last error is returned.
pub struct FailoverBackend {
    backends: Vec<Box<dyn LlmBackend>>,
    policy: RetryPolicy,
    #[cfg(test)]
    sleep_fn: Option<SleepFn>,
}

impl FailoverBackend {
    pub fn new(
        primary: Box<dyn LlmBackend>,
        fallbacks: Vec<Box<dyn LlmBackend>>,
        policy: RetryPolicy,
    ) -> Self {
        let mut backends = Vec::with_capacity(fallbacks.len() + 1);
        backends.push(primary);
        backends.extend(fallbacks);
        Self {
            backends,
            policy,
            #[cfg(test)]
            sleep_fn: None,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn do_sleep(&self, ms: u64) {
        #[cfg(test)]
        if let Some(ref f) = self.sleep_fn {
            f(ms).await;
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
}

#[async_trait]
impl LlmBackend for FailoverBackend {
    fn name(&self) -> &str {
        "failover"
    }

    async fn generate(&self, prompt: &str) -> CreateMateResult<String> {
        let mut last_err: Option<CreateMateError> = None;

        for backend in &self.backends {
            for attempt in 0..=self.policy.max_retries {
                match backend.generate(prompt).await {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        if !is_retryable(&e) {
                            warn!(
                                backend = backend.name(),
                                attempt,
                                error = %e,
                                "Non-retryable error, moving to next backend"
                            );
                            last_err = Some(e);
                            break;
                        }

                        if attempt < self.policy.max_retries {
                            let delay = compute_backoff(&self.policy, attempt);
                            info!(
                                backend = backend.name(),
                                attempt,
                                delay_ms = delay,
                                error = %e,
                                "Retryable error, backing off"
                            );
                            self.do_sleep(delay).await;
                        }
                        last_err = Some(e);
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| CreateMateError::Llm("All failover backends exhausted".into())))
    }
}
