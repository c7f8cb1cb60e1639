//! Farcaster mini-app notification dispatch.
//!
//! Validation happens before any I/O. Upstream failures are not errors:
//! they come back as a `DispatchOutcome` with `sent == false`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::{NeynarClient, NeynarError, HEADER_API_KEY};

const NOTIFICATIONS_PATH: &str = "/v2/farcaster/frame/notifications";

const MAX_TITLE_CHARS: usize = 32;
const MAX_BODY_CHARS: usize = 128;
const MAX_TARGET_URL_CHARS: usize = 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotificationError {
    #[error("at least one target fid is required")]
    NoTargets,
    #[error("title is required")]
    EmptyTitle,
    #[error("title exceeds 32 characters")]
    TitleTooLong,
    #[error("body is required")]
    EmptyBody,
    #[error("body exceeds 128 characters")]
    BodyTooLong,
    #[error("invalid target url: {0}")]
    InvalidTargetUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub target_url: String,
}

impl Notification {
    pub fn validate(&self) -> Result<(), NotificationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(NotificationError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(NotificationError::TitleTooLong);
        }

        let body = self.body.trim();
        if body.is_empty() {
            return Err(NotificationError::EmptyBody);
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(NotificationError::BodyTooLong);
        }

        if self.target_url.len() > MAX_TARGET_URL_CHARS {
            return Err(NotificationError::InvalidTargetUrl(
                "longer than 1024 characters".to_string(),
            ));
        }
        let url = url::Url::parse(&self.target_url)
            .map_err(|e| NotificationError::InvalidTargetUrl(e.to_string()))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(NotificationError::InvalidTargetUrl(format!(
                "unsupported scheme {}",
                url.scheme()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct DispatchRequest<'a> {
    target_fids: &'a [u64],
    notification: &'a Notification,
}

/// Result of a dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub sent: bool,
    pub message: String,
}

impl DispatchOutcome {
    pub fn sent(targets: usize) -> Self {
        Self {
            sent: true,
            message: format!("notification sent to {} user(s)", targets),
        }
    }

    pub fn not_sent(reason: impl std::fmt::Display) -> Self {
        Self {
            sent: false,
            message: format!("notification not sent: {}", reason),
        }
    }
}

/// Reject bad input before any request is made.
pub fn validate_dispatch(
    target_fids: &[u64],
    notification: &Notification,
) -> Result<(), NotificationError> {
    if target_fids.is_empty() {
        return Err(NotificationError::NoTargets);
    }
    notification.validate()
}

/// Something that can deliver notifications to Farcaster users.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        target_fids: &[u64],
        notification: &Notification,
    ) -> Result<DispatchOutcome, NotificationError>;
}

#[async_trait]
impl Notifier for NeynarClient {
    async fn notify(
        &self,
        target_fids: &[u64],
        notification: &Notification,
    ) -> Result<DispatchOutcome, NotificationError> {
        self.send_notification(target_fids, notification).await
    }
}

impl NeynarClient {
    /// Send `notification` to every fid in `target_fids`.
    pub async fn send_notification(
        &self,
        target_fids: &[u64],
        notification: &Notification,
    ) -> Result<DispatchOutcome, NotificationError> {
        validate_dispatch(target_fids, notification)?;

        let outcome = match self.post_notification(target_fids, notification).await {
            Ok(()) => {
                info!(
                    targets = target_fids.len(),
                    title = %notification.title,
                    "notification dispatched"
                );
                DispatchOutcome::sent(target_fids.len())
            }
            Err(e) => {
                warn!(
                    error = %e,
                    targets = target_fids.len(),
                    "notification dispatch failed"
                );
                DispatchOutcome::not_sent(e)
            }
        };
        Ok(outcome)
    }

    async fn post_notification(
        &self,
        target_fids: &[u64],
        notification: &Notification,
    ) -> Result<(), NeynarError> {
        let resp = self
            .http
            .post(self.url(NOTIFICATIONS_PATH))
            .header(HEADER_API_KEY, &self.api_key)
            .json(&DispatchRequest {
                target_fids,
                notification,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::api_error(resp).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neynar::stub::{StubServer, TEST_API_KEY};
    use axum::http::StatusCode;

    fn notification() -> Notification {
        Notification {
            title: "Presale is live".to_string(),
            body: "Contribute before the hard cap fills".to_string(),
            target_url: "https://launchpad.example/presale/0x01".to_string(),
        }
    }

    #[test]
    fn test_valid_notification() {
        assert_eq!(validate_dispatch(&[3, 5650], &notification()), Ok(()));
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            validate_dispatch(&[], &notification()),
            Err(NotificationError::NoTargets)
        );

        let mut n = notification();
        n.title = "  ".to_string();
        assert_eq!(n.validate(), Err(NotificationError::EmptyTitle));

        let mut n = notification();
        n.title = "x".repeat(33);
        assert_eq!(n.validate(), Err(NotificationError::TitleTooLong));

        let mut n = notification();
        n.body = String::new();
        assert_eq!(n.validate(), Err(NotificationError::EmptyBody));

        let mut n = notification();
        n.body = "y".repeat(129);
        assert_eq!(n.validate(), Err(NotificationError::BodyTooLong));

        let mut n = notification();
        n.target_url = "not a url".to_string();
        assert!(matches!(n.validate(), Err(NotificationError::InvalidTargetUrl(_))));

        let mut n = notification();
        n.target_url = "ftp://launchpad.example".to_string();
        assert!(matches!(n.validate(), Err(NotificationError::InvalidTargetUrl(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let n = notification();
        let body = serde_json::to_value(DispatchRequest {
            target_fids: &[3],
            notification: &n,
        })
        .unwrap();
        assert_eq!(body["target_fids"], serde_json::json!([3]));
        assert_eq!(body["notification"]["title"], "Presale is live");
        assert_eq!(
            body["notification"]["target_url"],
            "https://launchpad.example/presale/0x01"
        );
    }

    #[tokio::test]
    async fn test_dispatch_posts_to_neynar() {
        let stub = StubServer::spawn(StatusCode::OK, r#"{"notification_deliveries": []}"#).await;

        let outcome = stub
            .client()
            .send_notification(&[3, 5650], &notification())
            .await
            .unwrap();
        assert!(outcome.sent);
        assert_eq!(outcome.message, "notification sent to 2 user(s)");

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, NOTIFICATIONS_PATH);
        assert_eq!(requests[0].api_key.as_deref(), Some(TEST_API_KEY));

        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body["target_fids"], serde_json::json!([3, 5650]));
        assert_eq!(body["notification"]["body"], "Contribute before the hard cap fills");
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_not_sent() {
        let stub = StubServer::spawn(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message": "internal error"}"#,
        )
        .await;

        let outcome = stub
            .client()
            .send_notification(&[3], &notification())
            .await
            .unwrap();
        assert!(!outcome.sent);
        assert!(outcome.message.starts_with("notification not sent: API error 500"));
        assert_eq!(stub.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_io() {
        let client = NeynarClient::new(&crate::config::NeynarConfig::default()).unwrap();
        let err = client.send_notification(&[], &notification()).await.unwrap_err();
        assert_eq!(err, NotificationError::NoTargets);
    }
}
