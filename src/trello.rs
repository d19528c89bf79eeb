//! Trello REST (v1) implementation of the [`BoardApi`] contract.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::board::{ApiError, Attachment, BoardApi, BoardList, Card};
use crate::config::HookConfig;

const DEFAULT_API_BASE: &str = "https://api.trello.com/1";

/// Overrides the API endpoint; integration tests point this at a local
/// stub server.
const API_BASE_VAR: &str = "TRELLO_API_BASE";

/// Thin client for the Trello REST API. Credentials ride along as
/// `key`/`token` query parameters on every request, as the API expects.
pub struct TrelloClient {
    http: Client,
    base_url: String,
    api_key: String,
    auth_token: String,
}

impl TrelloClient {
    pub fn new(api_key: impl Into<String>, auth_token: impl Into<String>) -> Self {
        let base_url =
            std::env::var(API_BASE_VAR).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::with_base_url(base_url, api_key, auth_token)
    }

    /// Client against a non-default endpoint.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            auth_token: auth_token.into(),
        }
    }

    pub fn from_config(config: &HookConfig) -> Self {
        Self::new(config.api_key.clone(), config.auth_token.clone())
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, &url).query(&[
            ("key", self.api_key.as_str()),
            ("token", self.auth_token.as_str()),
        ]);
        (url, builder)
    }

    async fn send(&self, url: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|source| {
            error!(url = %url, error = %source, "Request failed before a response arrived");
            ApiError::Transport {
                url: url.to_string(),
                source,
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = %status, "API returned an error status");
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (url, builder) = self.request(Method::GET, path);
        debug!(url = %url, "GET");
        let response = self.send(&url, builder).await?;
        response.json::<T>().await.map_err(|source| {
            error!(url = %url, error = %source, "Failed to decode response body");
            ApiError::Decode { url, source }
        })
    }

    async fn mutate(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<(), ApiError> {
        let (url, builder) = self.request(method.clone(), path);
        debug!(url = %url, method = %method, "Mutation");
        let builder = builder.query(params);
        self.send(&url, builder).await.map(|_| ())
    }
}

#[async_trait]
impl BoardApi for TrelloClient {
    async fn list_cards(&self, board_id: &str) -> Result<Vec<Card>, ApiError> {
        self.get_json(&format!("/boards/{board_id}/cards")).await
    }

    async fn get_card(&self, board_id: &str, card_id: &str) -> Result<Card, ApiError> {
        self.get_json(&format!("/boards/{board_id}/cards/{card_id}"))
            .await
    }

    async fn list_lists(&self, board_id: &str) -> Result<Vec<BoardList>, ApiError> {
        self.get_json(&format!("/boards/{board_id}/lists")).await
    }

    async fn list_attachments(&self, card_id: &str) -> Result<Vec<Attachment>, ApiError> {
        self.get_json(&format!("/cards/{card_id}/attachments"))
            .await
    }

    async fn attach_url(&self, card_id: &str, url: &str) -> Result<(), ApiError> {
        self.mutate(
            Method::POST,
            &format!("/cards/{card_id}/attachments"),
            &[("url", url)],
        )
        .await
    }

    async fn add_comment(&self, card_id: &str, text: &str) -> Result<(), ApiError> {
        self.mutate(
            Method::POST,
            &format!("/cards/{card_id}/actions/comments"),
            &[("text", text)],
        )
        .await
    }

    async fn set_card_list(&self, card_id: &str, list_id: &str) -> Result<(), ApiError> {
        self.mutate(Method::PUT, &format!("/cards/{card_id}"), &[("idList", list_id)])
            .await
    }
}
