use serde::Serialize;

/// JSON body returned to the webhook sender after a delivery is handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Processed {
        ok: bool,
        posted: &'static str,
        pr: u64,
        risk: String,
        label: String,
        truncated: bool,
        /// Set when the review call failed and a diagnostic was posted instead.
        #[serde(skip_serializing_if = "Option::is_none")]
        review_error: Option<String>,
    },
    Ignored {
        ok: bool,
        ignored: String,
        action: String,
    },
}
