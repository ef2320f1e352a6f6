//! Error taxonomy for the remote gateways.

use thiserror::Error;

/// A cart write could not be committed remotely.
///
/// Reads never produce this: read failures degrade to empty results inside
/// the gateway, so only mutations surface errors the caller can retry.
#[derive(Debug, Error)]
pub enum CartOperationError {
    /// The cart service could not be reached (connect, transport, timeout).
    #[error("cart service unreachable: {0}")]
    NetworkFailure(String),

    /// The cart service was reached and declined the write.
    #[error("cart service rejected the operation ({status}): {reason}")]
    ServerRejected { status: u16, reason: String },
}

impl CartOperationError {
    pub(crate) fn network(err: impl core::fmt::Display) -> Self {
        Self::NetworkFailure(err.to_string())
    }

    pub(crate) async fn rejected(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let reason = server_reason(resp).await;
        Self::ServerRejected { status, reason }
    }
}

/// A non-cart service call failed (auth, orders, payments, comments).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("service error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl GatewayError {
    pub(crate) fn network(err: impl core::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub(crate) fn parse(err: impl core::fmt::Display) -> Self {
        Self::Parse(err.to_string())
    }

    pub(crate) async fn api(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        Self::Api(status, server_reason(resp).await)
    }
}

/// Best-effort extraction of a human-readable reason from an error
/// response.
pub(crate) async fn server_reason(resp: reqwest::Response) -> String {
    reason_from_text(resp.text().await.unwrap_or_default())
}

/// The services wrap reasons in assorted envelopes: `{"message": ...}`,
/// `{"error": ...}` or DRF-style `{"detail": ...}`. Fall back to the raw
/// body text.
fn reason_from_text(text: String) -> String {
    if let Ok(body) = serde_json::from_str::<serde_json::Value>(&text) {
        for field in ["message", "error", "detail"] {
            if let Some(reason) = body.get(field).and_then(|value| value.as_str()) {
                return reason.to_string();
            }
        }
    }
    if text.is_empty() {
        "no reason given".to_string()
    } else {
        text
    }
}
