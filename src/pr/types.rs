/// What the reviewer knows about a pull request for one delivery.
/// Built from the PR and file-listing calls; never cached across requests.
#[derive(Debug, Clone)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub title: String,
    /// Empty when the PR has no description.
    pub body: String,
    /// Changed file paths in the order the host listed them.
    pub changed_files: Vec<String>,
}

/// Diff text handed to the model, bounded in length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffBundle {
    pub text: String,
    /// True when per-file patches were cut to fit the ceiling.
    pub truncated: bool,
}
