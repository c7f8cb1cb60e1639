//! Axum HTTP surface.
//!
//! Provides:
//!   GET  /health                      → "ok"
//!   GET  /api/profiles?addresses=a,b  → JSON profiles keyed by checksummed address
//!   POST /api/notify                  → dispatch a Farcaster notification
//!
//! Every JSON body carries `success` and `message`.

mod error;

pub use error::ApiError;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::address;
use crate::neynar::{Notification, Notifier};
use crate::profile::{display_name, Profile, ProfileResolver};

/// Shared state for the API routes.
#[derive(Clone)]
pub struct ApiState {
    pub resolver: Arc<dyn ProfileResolver>,
    pub notifier: Arc<dyn Notifier>,
}

/// Build the Axum router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/profiles", get(api_profiles))
        .route("/api/notify", post(api_notify))
        .with_state(state)
}

/// Start the API server.
pub async fn serve(state: ApiState, bind_addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = bind_addr, "api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct ProfilesQuery {
    /// Comma-separated address list.
    #[serde(default)]
    pub addresses: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub label: String,
}

async fn api_profiles(
    State(state): State<ApiState>,
    Query(query): Query<ProfilesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let requested: Vec<String> = query
        .addresses
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if requested.is_empty() {
        return Err(ApiError::BadRequest("addresses is required".to_string()));
    }

    let resolved = state.resolver.resolve(&requested).await;
    debug!(
        requested = requested.len(),
        resolved = resolved.len(),
        "profiles request"
    );

    let profiles: BTreeMap<String, ProfileView> = resolved
        .into_iter()
        .map(|(addr, profile)| {
            let key = address::checksum(&addr);
            let label = display_name(Some(&profile), &key);
            (key, ProfileView { profile, label })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("resolved {} profile(s)", profiles.len()),
        "profiles": profiles,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub fids: Vec<u64>,
    pub title: String,
    pub body: String,
    #[serde(alias = "target_url")]
    pub target_url: String,
}

async fn api_notify(
    State(state): State<ApiState>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let notification = Notification {
        title: req.title,
        body: req.body,
        target_url: req.target_url,
    };
    let outcome = state.notifier.notify(&req.fids, &notification).await?;

    let status = if outcome.sent {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((
        status,
        Json(serde_json::json!({
            "success": outcome.sent,
            "message": outcome.message,
        })),
    ))
}
