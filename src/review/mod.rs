pub mod risk;
pub mod types;

pub use risk::{classify, RiskLevel};
pub use types::{ReviewFailure, ReviewResult};

use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::Settings;
use types::{ChatMessage, ChatRequest, ChatResponse};

const SYSTEM_PROMPT: &str = "You are a senior software engineer performing a precise code review. \
     Be concise, specific, and actionable. Use short bullet points.";
const TEMPERATURE: f64 = 0.2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ATTEMPTS: u32 = 3;
const ERROR_BODY_LIMIT: usize = 200;

/// Client for an OpenAI-compatible chat completions endpoint.
///
/// Never fails outward: every error becomes a [`ReviewResult`] whose text
/// explains what went wrong, so the PR always gets a comment.
#[derive(Debug, Clone)]
pub struct ReviewClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    backoff_unit: Duration,
}

impl ReviewClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            backoff_unit: Duration::from_secs(1),
        }
    }

    pub fn from_settings(http: reqwest::Client, settings: &Settings) -> Self {
        Self::new(
            http,
            &settings.completion_base_url,
            settings.completion_api_key.clone(),
            &settings.model,
        )
    }

    /// Scale of the linear backoff between rate-limited attempts
    /// (`2 * attempt * unit`).
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Pause after the given failed attempt: 2 units, then 4.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit * 2 * attempt
    }

    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn review(&self, prompt: &str) -> ReviewResult {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("completion API key not configured");
            return ReviewResult::failed(ReviewFailure::NotConfigured);
        };

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        for attempt in 1..=MAX_ATTEMPTS {
            let response = match self
                .http
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .timeout(REQUEST_TIMEOUT)
                .json(&request)
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    warn!(attempt, error = %err, "completion request failed");
                    return ReviewResult::failed(ReviewFailure::Transport(err.to_string()));
                }
            };

            let status = response.status();
            if status.is_success() {
                return parse_completion(response).await;
            }

            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS && !body.to_lowercase().contains("quota") {
                warn!(attempt, "completion rate limited");
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                }
                continue;
            }

            warn!(attempt, status = status.as_u16(), "completion request rejected");
            return ReviewResult::failed(ReviewFailure::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        ReviewResult::failed(ReviewFailure::RateLimited)
    }
}

async fn parse_completion(response: reqwest::Response) -> ReviewResult {
    let parsed: ChatResponse = match response.json().await {
        Ok(parsed) => parsed,
        Err(err) => return ReviewResult::failed(ReviewFailure::MalformedResponse(err.to_string())),
    };
    match parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
    {
        Some(content) => {
            let text = content.trim();
            info!(review_len = text.len(), "received review");
            ReviewResult::success(text)
        }
        None => {
            debug!("completion response had no message content");
            ReviewResult::failed(ReviewFailure::MalformedResponse(
                "no choices in completion".to_string(),
            ))
        }
    }
}
