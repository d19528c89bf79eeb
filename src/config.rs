use tracing::{info, warn};

/// Resolved hook configuration. Passed by reference to the handler and
/// every API-calling function; nothing reads the environment after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
    pub api_key: String,
    pub auth_token: String,
    pub board_id: String,
    pub card_action: CardAction,
    /// Read for parity with the action inputs; the pull-request dispatch
    /// does not consult it.
    pub list_name_commit: String,
    pub list_name_pr_open: Option<String>,
    pub list_name_pr_closed: Option<String>,
    /// Marker that precedes card ids in commit and pull-request messages.
    pub card_id_pattern: String,
}

impl HookConfig {
    pub fn trace_loaded(&self) {
        info!(
            board_id = %self.board_id,
            card_action = ?self.card_action,
            list_pr_open = self.list_name_pr_open.as_deref().unwrap_or("<unset>"),
            list_pr_closed = self.list_name_pr_closed.as_deref().unwrap_or("<unset>"),
            "Loaded HookConfig"
        );
    }
}

/// What to do on the matched card besides moving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    /// Attach the pull request URL to the card.
    Attachment,
    /// Post a comment with author, title and URL of the pull request.
    Comment,
    /// No card action, only list moves apply.
    None,
}

impl From<&str> for CardAction {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "attachment" => CardAction::Attachment,
            "comment" => CardAction::Comment,
            other => {
                warn!(action = other, "Unknown card action, skipping card actions");
                CardAction::None
            }
        }
    }
}
