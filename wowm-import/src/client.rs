//! Marketplace backend client
//!
//! Wire types for the item creation endpoint and the two seams the import
//! driver depends on: [`ItemCreator`] and [`ListingRefresher`].
//! [`BackendClient`] implements both over HTTP.

use crate::parser::ImportRecord;
use crate::session::SubmitOutcome;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wowm_common::config::BackendConfig;

const CSRF_HEADER: &str = "x-csrftoken";

/// Backend client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Non-2xx response
    #[error("HTTP error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Body of `POST <add-item endpoint>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    pub is_decor: bool,
    /// Canonical profession name, omitted when the item has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession_name: Option<String>,
}

impl From<&ImportRecord> for AddItemRequest {
    fn from(record: &ImportRecord) -> Self {
        Self {
            name: record.name.clone(),
            is_decor: record.is_decor,
            profession_name: record.profession.map(|p| p.as_str().to_string()),
        }
    }
}

/// Response of the add-item endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// `Some(false)` means the item already existed
    #[serde(default)]
    pub created_item: Option<bool>,
    #[serde(default)]
    pub profession_name: Option<String>,
}

impl AddItemResponse {
    /// Classify an application-level response
    pub fn outcome(&self) -> SubmitOutcome {
        if !self.ok {
            return SubmitOutcome::Failed(
                self.error
                    .clone()
                    .unwrap_or_else(|| "Unknown backend error".to_string()),
            );
        }
        if self.created_item == Some(false) {
            SubmitOutcome::Skipped
        } else {
            SubmitOutcome::Created
        }
    }
}

/// Creates one item on the backend
#[async_trait]
pub trait ItemCreator: Send + Sync {
    async fn create_item(&self, request: &AddItemRequest) -> Result<AddItemResponse, ClientError>;
}

/// Refreshes whatever view lists the tracked items
#[async_trait]
pub trait ListingRefresher: Send + Sync {
    async fn refresh_listing(&self) -> Result<(), ClientError>;
}

/// HTTP client for the marketplace backend
pub struct BackendClient {
    http_client: reqwest::Client,
    add_item_url: String,
    listing_url: String,
    csrf_token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            add_item_url: config.add_item_url(),
            listing_url: config.listing_url(),
            csrf_token: config.csrf_token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn add_item_url(&self) -> &str {
        &self.add_item_url
    }

    /// CSRF header plus the matching cookie the backend checks it against
    fn csrf_headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.csrf_token {
            let header = HeaderValue::from_str(token)
                .map_err(|e| ClientError::NetworkError(format!("Invalid CSRF token: {}", e)))?;
            let cookie = HeaderValue::from_str(&format!("csrftoken={}", token))
                .map_err(|e| ClientError::NetworkError(format!("Invalid CSRF token: {}", e)))?;
            headers.insert(CSRF_HEADER, header);
            headers.insert(COOKIE, cookie);
        }
        Ok(headers)
    }
}

#[async_trait]
impl ItemCreator for BackendClient {
    async fn create_item(&self, request: &AddItemRequest) -> Result<AddItemResponse, ClientError> {
        tracing::debug!(url = %self.add_item_url, name = %request.name, "Submitting item");

        let response = self
            .http_client
            .post(&self.add_item_url)
            .headers(self.csrf_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError(status.as_u16(), error_text));
        }

        response
            .json::<AddItemResponse>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ListingRefresher for BackendClient {
    async fn refresh_listing(&self) -> Result<(), ClientError> {
        let response = self
            .http_client
            .get(&self.listing_url)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError(status.as_u16(), error_text));
        }

        tracing::info!(url = %self.listing_url, "Item listing refreshed");
        Ok(())
    }
}
