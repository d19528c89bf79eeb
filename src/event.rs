use std::fs;
use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use tracing::{error, info, warn};

/// Payload of the triggering workflow event, as written to the file named
/// by `GITHUB_EVENT_PATH`. Only the pull-request section is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    pub pull_request: Option<PullRequestEvent>,
}

/// The pull request that triggered the run. Read-only input; fields are
/// presence-checked, never validated beyond that.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub state: String,
    pub html_url: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub user: Option<EventUser>,
    pub head: HeadRef,
}

impl PullRequestEvent {
    /// Web link of the pull request, preferring the browser URL.
    pub fn link(&self) -> Option<&str> {
        self.html_url.as_deref().or(self.url.as_deref())
    }

    pub fn user_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|user| user.name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventUser {
    pub name: Option<String>,
}

/// Source branch of the pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadRef {
    #[serde(rename = "ref")]
    pub branch: String,
}

/// Reads and parses the event payload file.
pub fn load_event(path: &Path) -> Result<EventPayload> {
    info!(event_path = ?path, "Loading event payload");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, event_path = ?path, "Failed to read event payload file");
            return Err(anyhow::anyhow!(
                "failed to read event payload {path:?}: {e}"
            ));
        }
    };

    match serde_json::from_str::<EventPayload>(&content) {
        Ok(payload) => {
            info!(
                has_pull_request = payload.pull_request.is_some(),
                "Parsed event payload"
            );
            Ok(payload)
        }
        Err(e) => {
            error!(error = ?e, event_path = ?path, "Failed to parse event payload JSON");
            Err(anyhow::anyhow!("failed to parse event payload: {e}"))
        }
    }
}

const MERGE_COMMIT_PREFIX: &str = r"Merge pull request #\d+ from \S+\s*";

/// Extracts card ids from a commit or pull-request message: occurrences of
/// the configured marker (e.g. `#` or `CARD-`) followed by digits, after
/// stripping the merge-commit prefix. Alternative resolution path to the
/// branch-name lookup; the pull-request dispatch does not use it.
pub fn card_ids_from_text(pattern: &str, message: &str) -> Option<Vec<String>> {
    if message.is_empty() {
        return None;
    }
    let prefix = Regex::new(MERGE_COMMIT_PREFIX).ok()?;
    let marker = match Regex::new(&format!(r"{}(\d+)", regex::escape(pattern))) {
        Ok(marker) => marker,
        Err(e) => {
            warn!(pattern = pattern, error = %e, "Unusable card id pattern");
            return None;
        }
    };

    let stripped = prefix.replace_all(message, "");
    let ids: Vec<String> = marker
        .captures_iter(&stripped)
        .map(|captures| captures[1].to_string())
        .collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}
