//! Pull-request handling: card lookups and the action dispatch.
//!
//! The handler runs one pull-request event end-to-end against a board:
//!   - Resolves the card whose name equals the PR source branch
//!   - Attaches the PR link or posts a comment, per configured action
//!   - Moves the card to the open/closed list matching the PR state
//!   - Returns a [`HandlerReport`] of what was changed
//!
//! All calls are sequential and awaited one at a time; there is no
//! fan-out, queueing or retry. A failed lookup or mutation is logged and
//! its step skipped. The one fatal condition is a branch with no matching
//! card: without a card, no action can be taken, so the run aborts before
//! any mutation.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::board::{ApiError, BoardApi, Card};
use crate::config::{CardAction, HookConfig};
use crate::event::PullRequestEvent;

/// Fatal failure of a run. Everything else is logged and skipped.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("no card found matching branch name '{branch}'")]
    CardNotFound { branch: String },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// First card on the board whose name equals `name` exactly
/// (case-sensitive). Response order decides ties between duplicate names.
pub async fn card_id_by_name<A: BoardApi + ?Sized>(
    api: &A,
    board_id: &str,
    name: &str,
) -> Result<Option<String>, ApiError> {
    if name.is_empty() {
        return Ok(None);
    }
    let cards = api.list_cards(board_id).await?;
    let card_id = cards
        .into_iter()
        .find(|card| card.name == name)
        .map(|card| card.id);
    debug!(board_id = %board_id, name = %name, card_id = ?card_id, "Card lookup by name");
    Ok(card_id)
}

/// Full card record, or `None` for an empty id.
pub async fn card_on_board<A: BoardApi + ?Sized>(
    api: &A,
    board_id: &str,
    card_id: &str,
) -> Result<Option<Card>, ApiError> {
    if card_id.is_empty() {
        return Ok(None);
    }
    api.get_card(board_id, card_id).await.map(Some)
}

/// First open list on the board with the given name. Closed lists never
/// match, even when their name does.
pub async fn list_id_by_name<A: BoardApi + ?Sized>(
    api: &A,
    board_id: &str,
    list_name: &str,
) -> Result<Option<String>, ApiError> {
    let lists = api.list_lists(board_id).await?;
    Ok(lists
        .into_iter()
        .find(|list| !list.closed && list.name == list_name)
        .map(|list| list.id))
}

/// Whether any attachment on the card already points at GitHub.
pub async fn has_github_attachment<A: BoardApi + ?Sized>(
    api: &A,
    card_id: &str,
) -> Result<bool, ApiError> {
    let attachments = api.list_attachments(card_id).await?;
    Ok(attachments
        .iter()
        .any(|attachment| attachment.url.contains("github.com")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    AlreadyAttached,
}

/// Attaches the pull-request link, unless the card already carries a
/// GitHub attachment. A failed presence probe counts as "not attached";
/// the worst case is a duplicate attachment.
pub async fn attach_pull_request<A: BoardApi + ?Sized>(
    api: &A,
    card: &Card,
    link: &str,
) -> Result<AttachOutcome, ApiError> {
    if card.badges.attachments > 0 {
        match has_github_attachment(api, &card.id).await {
            Ok(true) => {
                info!(card = %card.name, "Card already has a GitHub attachment, skipping");
                return Ok(AttachOutcome::AlreadyAttached);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(card_id = %card.id, error = %e, "Attachment check failed, assuming none attached");
            }
        }
    }
    info!(card_id = %card.id, link = %link, "Attaching pull request link");
    api.attach_url(&card.id, link).await?;
    Ok(AttachOutcome::Attached)
}

/// Posts `"<user>: <message> <link>"` on the card.
pub async fn comment_on_card<A: BoardApi + ?Sized>(
    api: &A,
    card_id: &str,
    user: &str,
    message: &str,
    link: &str,
) -> Result<(), ApiError> {
    let text = format!("{user}: {message} {link}");
    info!(card_id = %card_id, "Posting pull request comment");
    api.add_comment(card_id, &text).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    ListNotFound,
}

/// Moves the card to the named list. When no open list matches, nothing
/// is sent and the card stays where it is.
pub async fn move_card_to_list<A: BoardApi + ?Sized>(
    api: &A,
    board_id: &str,
    card_id: &str,
    list_name: &str,
) -> Result<MoveOutcome, ApiError> {
    match list_id_by_name(api, board_id, list_name).await? {
        Some(list_id) => {
            info!(card_id = %card_id, list = %list_name, list_id = %list_id, "Moving card");
            api.set_card_list(card_id, &list_id).await?;
            Ok(MoveOutcome::Moved)
        }
        None => {
            warn!(board_id = %board_id, list = %list_name, "No open list with that name, card not moved");
            Ok(MoveOutcome::ListNotFound)
        }
    }
}

/// What a single run changed, for the final summary.
#[derive(Debug, Default)]
pub struct HandlerReport {
    pub card_id: String,
    pub attachment: Option<AttachOutcome>,
    pub commented: bool,
    pub moved_to: Option<String>,
}

/// Entrypoint: handle one pull-request event end-to-end.
pub async fn handle_pull_request<A: BoardApi + ?Sized>(
    api: &A,
    config: &HookConfig,
    event: &PullRequestEvent,
) -> Result<HandlerReport, HandlerError> {
    info!(state = %event.state, "Handling pull request event");

    let link = event.link().unwrap_or_default();
    let message = event.title.as_deref().unwrap_or_default();
    let user = event.user_name();
    let branch = event.head.branch.as_str();

    let card_id = card_id_by_name(api, &config.board_id, branch)
        .await?
        .ok_or_else(|| HandlerError::CardNotFound {
            branch: branch.to_string(),
        })?;

    let mut report = HandlerReport {
        card_id: card_id.clone(),
        ..Default::default()
    };

    let card = match card_on_board(api, &config.board_id, &card_id).await {
        Ok(Some(card)) => card,
        Ok(None) => {
            warn!(card_id = %card_id, "Card vanished between lookup and fetch, nothing to do");
            return Ok(report);
        }
        Err(e) => {
            error!(card_id = %card_id, error = %e, "Card fetch failed, nothing to do");
            return Ok(report);
        }
    };

    match config.card_action {
        CardAction::Attachment => match attach_pull_request(api, &card, link).await {
            Ok(outcome) => report.attachment = Some(outcome),
            Err(e) => {
                error!(card_id = %card.id, error = %e, "Attaching pull request link failed")
            }
        },
        CardAction::Comment => match comment_on_card(api, &card.id, user, message, link).await {
            Ok(()) => report.commented = true,
            Err(e) => {
                error!(card_id = %card.id, error = %e, "Posting pull request comment failed")
            }
        },
        CardAction::None => {}
    }

    let target_list = match event.state.as_str() {
        "open" => config.list_name_pr_open.as_deref(),
        "closed" => config.list_name_pr_closed.as_deref(),
        _ => None,
    };
    if let Some(list_name) = target_list {
        match move_card_to_list(api, &config.board_id, &card.id, list_name).await {
            Ok(MoveOutcome::Moved) => report.moved_to = Some(list_name.to_string()),
            Ok(MoveOutcome::ListNotFound) => {}
            Err(e) => {
                error!(card_id = %card.id, list = %list_name, error = %e, "Moving card failed")
            }
        }
    }

    Ok(report)
}
