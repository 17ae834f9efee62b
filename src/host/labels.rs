use tracing::{info, instrument};

use super::{HostClient, HostError, Label};
use crate::review::RiskLevel;

const RISK_LABEL_DESCRIPTION: &str = "AI reviewer assessed risk";

/// Fixed label name and color for each risk level.
pub fn risk_label(risk: RiskLevel) -> (&'static str, &'static str) {
    match risk {
        RiskLevel::Low => ("risk: low", "#2ea043"),
        RiskLevel::Medium => ("risk: medium", "#fbca04"),
        RiskLevel::High => ("risk: high", "#d73a4a"),
    }
}

/// Ensure the risk label exists on the repository and attach it to the issue.
///
/// Safe to repeat: the label is looked up by name before creation, and
/// attaching an already-present label leaves the issue unchanged. Labels for
/// other risk levels from earlier deliveries are left in place.
#[instrument(skip(host))]
pub async fn apply_risk(
    host: &HostClient,
    owner: &str,
    repo: &str,
    issue_index: u64,
    risk: RiskLevel,
) -> Result<Label, HostError> {
    let (name, color) = risk_label(risk);
    let label = host
        .ensure_label(owner, repo, name, color, RISK_LABEL_DESCRIPTION)
        .await?;
    host.attach_label(owner, repo, issue_index, label.id).await?;
    info!(label = %label.name, id = label.id, color = %label.color, "applied risk label");
    Ok(label)
}
