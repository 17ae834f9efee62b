use serde::Deserialize;

use super::WebhookError;

pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// Pull-request actions that trigger a review.
pub const REVIEWED_ACTIONS: [&str; 3] = ["opened", "synchronized", "reopened"];

/// A pull-request lifecycle notification, built once per delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub event_type: String,
    pub action: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub body: String,
}

/// What to do with a verified delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Ignored { event_type: String, action: String },
    Process(WebhookEvent),
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    action: String,
    repository: RepositoryPayload,
    pull_request: PullRequestRef,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: OwnerPayload,
}

/// Gitea sends both `login` and `username`; Gogs only `username`.
#[derive(Debug, Deserialize)]
struct OwnerPayload {
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl OwnerPayload {
    fn into_name(self) -> Option<String> {
        self.login
            .filter(|l| !l.is_empty())
            .or(self.username.filter(|u| !u.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Option<String>,
}

/// Decide whether a delivery is reviewed, and parse it if so.
///
/// Only the `action` field is read for events that end up ignored, so
/// unrelated payload shapes never fail parsing.
pub fn triage(event_type: &str, raw_body: &[u8]) -> Result<Disposition, WebhookError> {
    let value: serde_json::Value = serde_json::from_slice(raw_body)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;
    let action = value
        .get("action")
        .and_then(|a| a.as_str())
        .unwrap_or_default()
        .to_string();

    if event_type != PULL_REQUEST_EVENT || !REVIEWED_ACTIONS.contains(&action.as_str()) {
        return Ok(Disposition::Ignored {
            event_type: event_type.to_string(),
            action,
        });
    }

    let payload: PullRequestPayload = serde_json::from_value(value)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;
    let owner = payload.repository.owner.into_name().ok_or_else(|| {
        WebhookError::MalformedPayload("repository owner has no login or username".to_string())
    })?;

    Ok(Disposition::Process(WebhookEvent {
        event_type: event_type.to_string(),
        action: payload.action,
        owner,
        repo: payload.repository.name,
        number: payload.pull_request.number,
        title: payload.pull_request.title,
        body: payload.pull_request.body.unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pr_payload(action: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "action": action,
            "number": 7,
            "repository": { "name": "widgets", "owner": { "login": "acme" } },
            "pull_request": { "number": 7, "title": "Add cache", "body": null }
        }))
        .unwrap()
    }

    #[test]
    fn test_opened_is_processed() {
        let disposition = triage("pull_request", &pr_payload("opened")).unwrap();
        assert_eq!(
            disposition,
            Disposition::Process(WebhookEvent {
                event_type: "pull_request".to_string(),
                action: "opened".to_string(),
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                number: 7,
                title: "Add cache".to_string(),
                body: String::new(),
            })
        );
    }

    #[test]
    fn test_reviewed_actions() {
        for action in ["synchronized", "reopened"] {
            assert!(matches!(
                triage("pull_request", &pr_payload(action)).unwrap(),
                Disposition::Process(_)
            ));
        }
    }

    #[test]
    fn test_other_actions_are_ignored() {
        assert_eq!(
            triage("pull_request", &pr_payload("closed")).unwrap(),
            Disposition::Ignored {
                event_type: "pull_request".to_string(),
                action: "closed".to_string(),
            }
        );
    }

    #[test]
    fn test_other_events_are_ignored_without_pr_fields() {
        let body = br#"{"ref": "refs/heads/main", "commits": []}"#;
        assert_eq!(
            triage("push", body).unwrap(),
            Disposition::Ignored {
                event_type: "push".to_string(),
                action: String::new(),
            }
        );
    }

    #[test]
    fn test_owner_username_alias() {
        let body = serde_json::to_vec(&json!({
            "action": "opened",
            "repository": { "name": "widgets", "owner": { "username": "acme" } },
            "pull_request": { "number": 3 }
        }))
        .unwrap();
        match triage("pull_request", &body).unwrap() {
            Disposition::Process(event) => {
                assert_eq!(event.owner, "acme");
                assert!(event.title.is_empty());
            }
            other => panic!("unexpected disposition: {other:?}"),
        }
    }

    #[test]
    fn test_owner_with_login_and_username() {
        let body = serde_json::to_vec(&json!({
            "action": "opened",
            "repository": {
                "name": "widgets",
                "owner": { "id": 1, "login": "acme", "username": "acme-legacy" }
            },
            "pull_request": { "number": 3, "title": "Fix" }
        }))
        .unwrap();
        match triage("pull_request", &body).unwrap() {
            Disposition::Process(event) => assert_eq!(event.owner, "acme"),
            other => panic!("unexpected disposition: {other:?}"),
        }
    }

    #[test]
    fn test_owner_without_name_is_malformed() {
        let body = serde_json::to_vec(&json!({
            "action": "opened",
            "repository": { "name": "widgets", "owner": { "id": 1 } },
            "pull_request": { "number": 3 }
        }))
        .unwrap();
        assert!(matches!(
            triage("pull_request", &body),
            Err(WebhookError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let body = br#"{"action": "opened", "pull_request": {"number": 1}}"#;
        assert!(matches!(
            triage("pull_request", body),
            Err(WebhookError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(
            triage("pull_request", b"not json"),
            Err(WebhookError::MalformedPayload(_))
        ));
    }
}
