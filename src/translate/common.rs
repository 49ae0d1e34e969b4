use serde::{Deserialize, Serialize};

use crate::error::SubtranError;

/// Body posted to the translation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub target_language: String,
    pub text: String,
}

impl TranslationRequest {
    pub fn new(target_language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            text: text.into(),
        }
    }
}

/// Body returned by the translation endpoint on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated_text: String,
}

/// Result of a single request attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(String),
    /// Network error, non-success status or unreadable body
    Retryable(SubtranError),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
