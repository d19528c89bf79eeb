//! Contract between the pull-request handler and the board backend.
//!
//! The handler only sees the [`BoardApi`] trait; the Trello REST client in
//! [`crate::trello`] implements it for production and `mockall` generates
//! deterministic mocks for tests. All data types here are transient: they
//! are fetched fresh per run and never cached or mutated locally (mutations
//! happen through the remote API).

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Deserialize;

/// A card on the board.
#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub badges: CardBadges,
}

/// Per-card counters reported by the API; only the attachment count is
/// consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardBadges {
    #[serde(default)]
    pub attachments: u32,
}

/// A list on the board. Closed lists never qualify as move targets.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

/// An attachment on a card; only the URL is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub url: String,
}

/// Failure of a single API call. "The endpoint answered with an error
/// status" stays distinguishable from "the request never completed".
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Remote board operations needed by the pull-request handler.
///
/// Implementors own transport and authentication; the trait is agnostic of
/// both. Calls are issued strictly one at a time by the handler.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// All cards on a board, in API response order. No pagination: the
    /// full card list is assumed to fit in one response.
    async fn list_cards(&self, board_id: &str) -> Result<Vec<Card>, ApiError>;

    /// Full record of a single card. Board membership is not validated.
    async fn get_card(&self, board_id: &str, card_id: &str) -> Result<Card, ApiError>;

    /// All lists on a board, including closed ones.
    async fn list_lists(&self, board_id: &str) -> Result<Vec<BoardList>, ApiError>;

    /// Attachments currently on a card.
    async fn list_attachments(&self, card_id: &str) -> Result<Vec<Attachment>, ApiError>;

    /// Attach a URL to a card.
    async fn attach_url(&self, card_id: &str, url: &str) -> Result<(), ApiError>;

    /// Post a plain-text comment on a card.
    async fn add_comment(&self, card_id: &str, text: &str) -> Result<(), ApiError>;

    /// Move a card to another list.
    async fn set_card_list(&self, card_id: &str, list_id: &str) -> Result<(), ApiError>;
}
