//! Neynar Farcaster API client.
//!
//! Two endpoints are used:
//! - `GET /v2/farcaster/user/bulk-by-address` backs the profile resolver
//! - `POST /v2/farcaster/frame/notifications` sends mini-app notifications
//!
//! Every request carries the API key in the `api_key` header.

pub mod notifications;
pub mod users;

#[cfg(test)]
pub(crate) mod stub;

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::NeynarConfig;

pub use notifications::{DispatchOutcome, Notification, NotificationError, Notifier};

const HEADER_API_KEY: &str = "api_key";

#[derive(Error, Debug)]
pub enum NeynarError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct NeynarClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl NeynarClient {
    pub fn new(config: &NeynarConfig) -> Result<Self, NeynarError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read the body of a non-2xx response into an `Api` error.
    async fn api_error(resp: reqwest::Response) -> NeynarError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        NeynarError::Api { status, body }
    }
}
