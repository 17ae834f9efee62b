pub mod types;

pub use types::Outcome;

use crate::host::Label;
use crate::pr::{DiffBundle, PullRequestContext};
use crate::review::{ReviewResult, RiskLevel};

/// Render the markdown comment posted on the pull request.
///
/// 🤖 **AI Reviewer**
/// - PR: #7 in acme/widgets
/// - Files: 2
///
/// (review text)
pub fn render_comment(
    context: &PullRequestContext,
    diff: &DiffBundle,
    review: &ReviewResult,
) -> String {
    let mut md = String::new();
    md.push_str("🤖 **AI Reviewer**\n");
    md.push_str(&format!(
        "- PR: #{} in {}/{}\n",
        context.number, context.owner, context.repo
    ));
    md.push_str(&format!("- Files: {}\n", context.changed_files.len()));
    if diff.truncated {
        md.push_str("- Note: diff was truncated before review\n");
    }
    md.push('\n');
    md.push_str(&review.text);
    md
}

/// Summarise a processed delivery for the webhook response.
pub fn build(
    context: &PullRequestContext,
    diff: &DiffBundle,
    review: &ReviewResult,
    risk: RiskLevel,
    label: &Label,
) -> Outcome {
    Outcome::Processed {
        ok: true,
        posted: "comment+label",
        pr: context.number,
        risk: risk.to_string(),
        label: label.name.clone(),
        truncated: diff.truncated,
        review_error: review.failure.as_ref().map(ToString::to_string),
    }
}
