//! `WhatsApp` webhook handler
//!
//! `GET` answers the subscription handshake, `POST` receives message events.
//! Deliveries are acknowledged with 200 even when relaying failed, so the
//! platform does not redeliver.

mod process;
pub mod signature;

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

pub use self::process::{
    EMPTY_DOCUMENT_REPLY, EMPTY_SUMMARY_REPLY, PROCESSING_FAILED_REPLY, summary_prompt,
};
use self::signature::{SIGNATURE_HEADER, constant_time_eq, verify_signature};
use crate::api::ApiState;
use crate::channels::parse_envelope;

/// Mode value the platform sends during the handshake
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Webhook response
#[derive(Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

/// Handshake query parameters
#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Check a subscription handshake
///
/// Returns the challenge to echo back if mode and token match.
#[must_use]
pub fn verify_subscription(params: &VerifyParams, expected_token: &str) -> Option<String> {
    let mode = params.mode.as_deref()?;
    let token = params.verify_token.as_deref()?;
    let challenge = params.challenge.as_deref()?;

    (mode == SUBSCRIBE_MODE && constant_time_eq(token, expected_token)).then(|| challenge.to_string())
}

/// Handle `GET /webhook`
pub async fn verify(
    State(state): State<Arc<ApiState>>,
    query: Result<Query<VerifyParams>, QueryRejection>,
) -> Response {
    // An unparsable handshake is a mismatch like any other
    let Ok(Query(params)) = query else {
        tracing::warn!("webhook verification failed: unparsable query");
        return StatusCode::FORBIDDEN.into_response();
    };

    match verify_subscription(&params, state.verify_token.expose_secret()) {
        Some(challenge) => {
            tracing::info!("webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            tracing::warn!(mode = ?params.mode, "webhook verification failed");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// Handle `POST /webhook`
///
/// Processes the first message inline and answers once relaying is done.
pub async fn receive(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    if let Some(secret) = &state.app_secret {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if let Err(e) = verify_signature(&body, provided, secret.expose_secret()) {
            tracing::warn!(error = %e, "rejecting webhook delivery");
            return (StatusCode::UNAUTHORIZED, Json(WebhookResponse { ok: false }));
        }
    }

    let event = match parse_envelope(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "webhook error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookResponse { ok: false }),
            );
        }
    };

    process::process_event(&state, event).await;

    (StatusCode::OK, Json(WebhookResponse { ok: true }))
}
