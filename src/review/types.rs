use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a review could not be produced. The display text is what gets posted
/// in place of the review.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewFailure {
    #[error("LLM not configured (set OPENAI_API_KEY).")]
    NotConfigured,

    #[error("LLM rate limited repeatedly; try again later.")]
    RateLimited,

    #[error("LLM error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM request failed: {0}")]
    Transport(String),

    #[error("LLM returned an unexpected response: {0}")]
    MalformedResponse(String),
}

/// Outcome of a review call. `text` is always postable: the model's review
/// on success, a diagnostic otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResult {
    pub text: String,
    pub failure: Option<ReviewFailure>,
}

impl ReviewResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failure: None,
        }
    }

    pub fn failed(failure: ReviewFailure) -> Self {
        Self {
            text: failure.to_string(),
            failure: Some(failure),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 2],
    pub temperature: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_carries_diagnostic_text() {
        let result = ReviewResult::failed(ReviewFailure::Status {
            status: 500,
            body: "upstream down".to_string(),
        });
        assert_eq!(result.text, "LLM error 500: upstream down");
        assert!(result.failure.is_some());
    }

    #[test]
    fn test_not_configured_text() {
        let result = ReviewResult::failed(ReviewFailure::NotConfigured);
        assert!(result.text.contains("not configured"));
    }
}
