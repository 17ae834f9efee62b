use regex::Regex;
use std::sync::LazyLock;

static RISK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)risk(?:\s*level)?\s*:\s*(low|medium|high)").expect("risk marker regex")
});

/// Coarse triage signal derived from the review text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Find the first `risk[ level]: low|medium|high` marker in the text.
/// Text without a marker is treated as [`RiskLevel::Medium`].
pub fn classify(review_text: &str) -> RiskLevel {
    let Some(captures) = RISK_MARKER.captures(review_text) else {
        return RiskLevel::default();
    };
    match captures[1].to_ascii_lowercase().as_str() {
        "low" => RiskLevel::Low,
        "high" => RiskLevel::High,
        _ => RiskLevel::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_markers() {
        assert_eq!(classify("Risk: High, because of unsafe SQL"), RiskLevel::High);
        assert_eq!(classify("risk level : LOW"), RiskLevel::Low);
        assert_eq!(classify("- Overall RISK:low"), RiskLevel::Low);
    }

    #[test]
    fn test_classify_defaults_to_medium() {
        assert_eq!(classify("no risk info here"), RiskLevel::Medium);
        assert_eq!(classify(""), RiskLevel::Medium);
        assert_eq!(classify("Risk: unknown"), RiskLevel::Medium);
    }

    #[test]
    fn test_first_marker_wins() {
        let text = "Risk level: Low\n\nEarlier drafts said risk: high";
        assert_eq!(classify(text), RiskLevel::Low);
    }

    #[test]
    fn test_risk_level_ordering_and_display() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::High.to_string(), "high");
    }
}
