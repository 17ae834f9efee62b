use serde::{Deserialize, Serialize};

/// Pull request metadata as returned by `GET /repos/{owner}/{repo}/pulls/{n}`.
/// Only the fields the reviewer reads are modelled; the rest are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    /// Hosts send `null` for an empty description.
    #[serde(default)]
    pub body: Option<String>,
}

/// One entry of `GET /repos/{owner}/{repo}/pulls/{n}/files`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileChange {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub additions: usize,
    #[serde(default)]
    pub deletions: usize,
    /// Absent for binary and rename-only changes.
    #[serde(default)]
    pub patch: Option<String>,
}

/// A repository-scoped label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewLabel<'a> {
    pub name: &'a str,
    pub color: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewComment<'a> {
    pub body: &'a str,
}
