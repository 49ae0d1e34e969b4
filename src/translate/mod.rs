// Translation client
//
// - Endpoint: one request attempt against the remote service
// - Retry: bounded retry with linear backoff over an endpoint
// - Languages: catalogue of selectable target languages

pub mod common;
pub mod http;
pub mod languages;
pub mod retry;

use async_trait::async_trait;
use std::sync::Arc;

pub use common::*;
pub use http::HttpEndpoint;
pub use languages::*;
pub use retry::{RetryPolicy, RetryingTranslator};

use crate::config::TranslateConfig;
use crate::error::Result;

/// A single request attempt, with no retry of its own
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationEndpoint: Send + Sync {
    async fn send(&self, request: &TranslationRequest) -> AttemptOutcome;
}

/// Translate one payload, retrying transient failures.
///
/// An `Err` is terminal for this payload; callers decide whether to carry on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> Result<String>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// HTTP endpoint wrapped in the configured retry policy
    pub fn create_translator(config: &TranslateConfig) -> Result<Arc<dyn Translator>> {
        let endpoint = HttpEndpoint::new(config)?;
        Ok(Arc::new(RetryingTranslator::new(endpoint, RetryPolicy::from_config(config))))
    }
}
