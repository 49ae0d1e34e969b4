use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TranslateConfig;
use crate::error::{Result, SubtranError};
use super::{Translator, TranslationEndpoint, common::{AttemptOutcome, TranslationRequest}};

/// Bounded retry with linearly increasing backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &TranslateConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before the given retry (1-indexed): base × retry
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }
}

/// Translator that drives a single-attempt endpoint through a retry policy
pub struct RetryingTranslator<E: TranslationEndpoint> {
    endpoint: E,
    policy: RetryPolicy,
}

impl<E: TranslationEndpoint> RetryingTranslator<E> {
    pub fn new(endpoint: E, policy: RetryPolicy) -> Self {
        Self { endpoint, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[async_trait]
impl<E: TranslationEndpoint> Translator for RetryingTranslator<E> {
    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let attempts = self.policy.total_attempts();
        let mut last_error: Option<SubtranError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.policy.delay_before_retry(attempt);
                warn!(
                    "Retrying ({}/{}) in {}ms: {}",
                    attempt,
                    self.policy.max_retries,
                    delay.as_millis(),
                    last_error.as_ref().map(|e| e.to_string()).unwrap_or_default()
                );
                tokio::time::sleep(delay).await;
            }

            match self.endpoint.send(request).await {
                AttemptOutcome::Success(text) => {
                    debug!("Translation succeeded on attempt {}/{}", attempt + 1, attempts);
                    return Ok(text);
                }
                AttemptOutcome::Retryable(e) => {
                    debug!("Attempt {}/{} failed: {}", attempt + 1, attempts, e);
                    last_error = Some(e);
                }
            }
        }

        Err(SubtranError::MaxRetries {
            attempts,
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
