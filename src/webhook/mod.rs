pub mod signature;
pub mod types;

pub use types::{Disposition, WebhookEvent};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::config::{Settings, SettingsProvider};
use crate::host::{labels, HostClient, HostError};
use crate::pr;
use crate::report::{self, Outcome};
use crate::review::{classify, ReviewClient};

const EVENT_HEADERS: [&str; 3] = ["X-Gitea-Event", "X-Gogs-Event", "X-GitHub-Event"];

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid signature")]
    Unauthorized,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl WebhookError {
    fn status(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Host(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "webhook delivery failed");
        }
        let body = Json(json!({ "ok": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Shared, read-only state for every delivery.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<dyn SettingsProvider>,
    http: reqwest::Client,
    review_backoff: Duration,
}

impl AppState {
    pub fn new(settings: Arc<dyn SettingsProvider>, http: reqwest::Client) -> Self {
        Self {
            settings,
            http,
            review_backoff: Duration::from_secs(1),
        }
    }

    pub fn with_review_backoff(mut self, unit: Duration) -> Self {
        self.review_backoff = unit;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/:name", post(receive))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /webhooks/:name`. Takes the body as raw bytes so the signature is
/// checked against exactly what was sent.
#[instrument(skip_all, fields(hook = %name))]
async fn receive(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Outcome>, WebhookError> {
    // Without settings there is no secret to check against, so the caller
    // gets the same answer as for a bad signature.
    let settings = match state.settings.settings() {
        Ok(settings) => settings,
        Err(err) => {
            error!(error = %err, "settings unavailable, rejecting delivery");
            return Err(WebhookError::Unauthorized);
        }
    };

    if !signature::verify(&settings.webhook_secret, &body, &headers) {
        warn!("rejected delivery with invalid signature");
        return Err(WebhookError::Unauthorized);
    }

    let event_type = event_type(&headers);
    match types::triage(&event_type, &body)? {
        Disposition::Ignored { event_type, action } => {
            info!(event = %event_type, action = %action, "ignoring delivery");
            Ok(Json(Outcome::Ignored {
                ok: true,
                ignored: event_type,
                action,
            }))
        }
        Disposition::Process(event) => process(&state, &settings, &event).await.map(Json),
    }
}

fn event_type(headers: &HeaderMap) -> String {
    EVENT_HEADERS
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .unwrap_or_default()
        .to_string()
}

/// Review one pull-request event end to end: fetch, diff, review, comment,
/// label. The comment is posted before the label so a labelling failure
/// still leaves the review visible.
#[instrument(skip_all, fields(event = %event.event_type, owner = %event.owner, repo = %event.repo, pr = event.number, action = %event.action))]
pub async fn process(
    state: &AppState,
    settings: &Settings,
    event: &WebhookEvent,
) -> Result<Outcome, WebhookError> {
    info!(title = %event.title, body_len = event.body.len(), "processing pull request event");
    let host = HostClient::new(
        state.http.clone(),
        &settings.host_base_url,
        &settings.host_token,
    );
    let reviewer = ReviewClient::from_settings(state.http.clone(), settings)
        .with_backoff_unit(state.review_backoff);

    let (context, files) = pr::fetch_context(&host, &event.owner, &event.repo, event.number).await?;
    let diff = pr::diff::build_diff(&files);
    info!(files = files.len(), diff_len = diff.text.len(), truncated = diff.truncated, "assembled diff");

    let prompt = pr::build_prompt(&context, &diff);
    let review = reviewer.review(&prompt).await;
    if let Some(failure) = &review.failure {
        warn!(reason = %failure, "review unavailable, posting diagnostic");
    }

    let comment = report::render_comment(&context, &diff, &review);
    host.post_comment(&event.owner, &event.repo, event.number, &comment)
        .await?;
    info!("posted review comment");

    let risk = classify(&review.text);
    let label = labels::apply_risk(&host, &event.owner, &event.repo, event.number, risk).await?;

    Ok(report::build(&context, &diff, &review, risk, &label))
}
