pub mod diff;
pub mod types;

pub use types::{DiffBundle, PullRequestContext};

use tracing::{debug, instrument};

use crate::host::{FileChange, HostClient, HostError};

/// At most this many file paths are listed in the prompt.
const PROMPT_FILE_LIMIT: usize = 20;

/// Fetch PR metadata and its changed files from the host.
///
/// Either call failing aborts the delivery; there is nothing to review
/// without both.
#[instrument(skip(host))]
pub async fn fetch_context(
    host: &HostClient,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<(PullRequestContext, Vec<FileChange>), HostError> {
    let pull = host.get_pull_request(owner, repo, number).await?;
    let files = host.get_pull_request_files(owner, repo, number).await?;
    let additions: usize = files.iter().map(|f| f.additions).sum();
    let deletions: usize = files.iter().map(|f| f.deletions).sum();
    debug!(number = pull.number, title = %pull.title, files = files.len(), additions, deletions, "fetched PR context");

    let context = PullRequestContext {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
        title: pull.title,
        body: pull.body.unwrap_or_default(),
        changed_files: files.iter().map(|f| f.filename.clone()).collect(),
    };
    Ok((context, files))
}

/// Render the user message sent to the model.
pub fn build_prompt(context: &PullRequestContext, diff: &DiffBundle) -> String {
    let notes = if context.body.trim().is_empty() {
        "(no description)"
    } else {
        context.body.trim()
    };
    let listed: Vec<&str> = context
        .changed_files
        .iter()
        .take(PROMPT_FILE_LIMIT)
        .map(String::as_str)
        .collect();
    let diff_text = if diff.text.is_empty() {
        "(no textual changes)"
    } else {
        diff.text.as_str()
    };

    format!(
        "Review this pull request:\n\
         \n\
         Repo: {owner}/{repo}\n\
         PR #{number}: {title}\n\
         Author notes:\n\
         {notes}\n\
         Files changed ({count}): {files}\n\
         \n\
         Tasks:\n\
         - Summarize the change in 2-4 bullets.\n\
         - Flag potential bugs, security or performance risks (reference file/line if possible).\n\
         - Suggest concrete improvements (short code snippets if helpful).\n\
         - Give a risk level: Low | Medium | High, with 1-line justification.\n\
         \n\
         Unified diff:\n\
         {diff_text}",
        owner = context.owner,
        repo = context.repo,
        number = context.number,
        title = context.title,
        count = context.changed_files.len(),
        files = listed.join(", "),
    )
}
