pub mod labels;
pub mod types;

pub use types::{FileChange, Label, PullRequest};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use types::{NewComment, NewLabel};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_LIMIT: usize = 50;
const MAX_PAGES: u32 = 20;
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Host API returned {status} for {method} {path}: {body}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },
}

/// Request body shapes accepted by different server versions for
/// `POST /repos/{owner}/{repo}/issues/{n}/labels`, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachShape {
    /// `[id]`
    IdArray,
    /// `{"labels": [id]}`
    LabelsObject,
}

impl AttachShape {
    pub const ORDER: [AttachShape; 2] = [AttachShape::IdArray, AttachShape::LabelsObject];

    fn body(self, label_id: u64) -> serde_json::Value {
        match self {
            AttachShape::IdArray => serde_json::json!([label_id]),
            AttachShape::LabelsObject => serde_json::json!({ "labels": [label_id] }),
        }
    }
}

/// Typed wrapper over the git-hosting REST API.
#[derive(Debug, Clone)]
pub struct HostClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HostClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        index: u64,
    ) -> Result<PullRequest, HostError> {
        self.get_json(&format!("/repos/{owner}/{repo}/pulls/{index}"), &[])
            .await
    }

    /// Fetch every changed file across all pages.
    #[instrument(skip(self))]
    pub async fn get_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        index: u64,
    ) -> Result<Vec<FileChange>, HostError> {
        self.get_all_pages(&format!("/repos/{owner}/{repo}/pulls/{index}/files"))
            .await
    }

    /// Every label of the repository, across all pages.
    pub async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>, HostError> {
        self.get_all_pages(&format!("/repos/{owner}/{repo}/labels"))
            .await
    }

    pub async fn create_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<Label, HostError> {
        let body = NewLabel {
            name,
            color: color.trim_start_matches('#'),
            description,
        };
        let response = self
            .post_json(&format!("/repos/{owner}/{repo}/labels"), &body)
            .await?;
        Ok(response.json().await?)
    }

    /// Case-insensitive lookup of an existing label by name.
    pub async fn find_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<Option<Label>, HostError> {
        let labels = self.list_labels(owner, repo).await?;
        Ok(labels
            .into_iter()
            .find(|label| label.name.eq_ignore_ascii_case(name)))
    }

    /// Return the label with this name, creating it only if none exists.
    #[instrument(skip(self, color, description))]
    pub async fn ensure_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
        description: &str,
    ) -> Result<Label, HostError> {
        if let Some(label) = self.find_label(owner, repo, name).await? {
            debug!(id = label.id, "label already exists");
            return Ok(label);
        }
        debug!("creating label");
        self.create_label(owner, repo, name, color, description)
            .await
    }

    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn post_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_index: u64,
        body: &str,
    ) -> Result<(), HostError> {
        self.post_json(
            &format!("/repos/{owner}/{repo}/issues/{issue_index}/comments"),
            &NewComment { body },
        )
        .await?;
        Ok(())
    }

    /// Attach a label to an issue, trying each [`AttachShape`] in order.
    /// Only non-2xx responses move on to the next shape; transport errors
    /// are returned immediately.
    #[instrument(skip(self))]
    pub async fn attach_label(
        &self,
        owner: &str,
        repo: &str,
        issue_index: u64,
        label_id: u64,
    ) -> Result<(), HostError> {
        let path = format!("/repos/{owner}/{repo}/issues/{issue_index}/labels");
        let mut last_error = None;

        for shape in AttachShape::ORDER {
            match self.post_json(&path, &shape.body(label_id)).await {
                Ok(_) => {
                    debug!(?shape, "label attached");
                    return Ok(());
                }
                Err(err @ HostError::Status { .. }) => {
                    warn!(?shape, error = %err, "label attach rejected, trying next shape");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| HostError::Status {
            method: "POST",
            path,
            status: 0,
            body: String::new(),
        }))
    }

    /// Follow `page`/`limit` pagination until a short page comes back, or
    /// stop at `MAX_PAGES`.
    async fn get_all_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, HostError> {
        let limit = PAGE_LIMIT.to_string();
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let page_param = page.to_string();
            let batch: Vec<T> = self
                .get_json(path, &[("page", page_param.as_str()), ("limit", limit.as_str())])
                .await?;
            let batch_len = batch.len();
            items.extend(batch);
            debug!(path, page, batch_len, total = items.len(), "received page");
            if batch_len < PAGE_LIMIT {
                return Ok(items);
            }
        }

        warn!(path, pages = MAX_PAGES, "listing hit page cap, remaining items skipped");
        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, HostError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .timeout(REQUEST_TIMEOUT)
            .query(query)
            .send()
            .await?;
        let response = check_status("GET", path, response).await?;
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, HostError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await?;
        check_status("POST", path, response).await
    }
}

async fn check_status(
    method: &'static str,
    path: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, HostError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HostError::Status {
        method,
        path: path.to_string(),
        status: status.as_u16(),
        body: body.chars().take(ERROR_BODY_LIMIT).collect(),
    })
}
