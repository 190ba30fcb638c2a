//! Client-carried OAuth bridge state
//!
//! The bridge keeps no server-side session between the authorize and
//! callback steps. The in-flight context is serialized, HMAC-signed and
//! handed to the client as the provider `state` parameter; the callback
//! verifies the signature and the expiry window before trusting it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AppError;

/// Maximum age of bridge state, from issuance to callback
pub const STATE_TTL_SECONDS: i64 = 600;

type HmacSha256 = Hmac<Sha256>;

/// In-flight OAuth context between the authorize and callback steps
///
/// Carries no secret capability by itself; expiry is the only replay
/// protection it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeState {
    /// Where to send the browser after the bridge completes
    pub client_redirect_uri: String,
    /// Issuance instant, epoch milliseconds
    pub issued_at: i64,
}

impl BridgeState {
    pub fn new(client_redirect_uri: impl Into<String>) -> Self {
        Self {
            client_redirect_uri: client_redirect_uri.into(),
            issued_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Signed wire form: the state fields plus the signature over them
#[derive(Debug, Serialize, Deserialize)]
struct SignedState {
    client_redirect_uri: String,
    issued_at: i64,
    signature: String,
}

fn compute_signature(state: &BridgeState, secret: &str) -> Result<Vec<u8>, AppError> {
    // Canonical form: JSON of the state without the signature field.
    // Field order is fixed by the struct declaration.
    let canonical =
        serde_json::to_vec(state).map_err(|e| AppError::Internal(e.into()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Encryption(e.to_string()))?;
    mac.update(&canonical);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Sign bridge state into a transportable token
///
/// Token format: base64url(json({state fields, signature})), where the
/// signature is HMAC-SHA256 over the canonical JSON of the state fields.
pub fn sign_state(state: &BridgeState, secret: &str) -> Result<String, AppError> {
    let signature = compute_signature(state, secret)?;

    let signed = SignedState {
        client_redirect_uri: state.client_redirect_uri.clone(),
        issued_at: state.issued_at,
        signature: URL_SAFE_NO_PAD.encode(signature),
    };

    let envelope = serde_json::to_vec(&signed).map_err(|e| AppError::Internal(e.into()))?;
    Ok(URL_SAFE_NO_PAD.encode(envelope))
}

/// Verify a bridge state token and enforce the expiry window
///
/// # Errors
/// `InvalidState` when the token is malformed or the recomputed
/// signature does not match (constant-time comparison);
/// `ExpiredState` when the state is older than [`STATE_TTL_SECONDS`].
pub fn verify_state(token: &str, secret: &str) -> Result<BridgeState, AppError> {
    verify_state_at(token, secret, Utc::now().timestamp_millis())
}

/// Verification against an explicit clock, for expiry tests
pub fn verify_state_at(token: &str, secret: &str, now_ms: i64) -> Result<BridgeState, AppError> {
    let envelope = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| AppError::InvalidState)?;
    let signed: SignedState =
        serde_json::from_slice(&envelope).map_err(|_| AppError::InvalidState)?;

    let carried_signature = URL_SAFE_NO_PAD
        .decode(&signed.signature)
        .map_err(|_| AppError::InvalidState)?;

    let state = BridgeState {
        client_redirect_uri: signed.client_redirect_uri,
        issued_at: signed.issued_at,
    };

    let canonical = serde_json::to_vec(&state).map_err(|e| AppError::Internal(e.into()))?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Encryption(e.to_string()))?;
    mac.update(&canonical);
    mac.verify_slice(&carried_signature)
        .map_err(|_| AppError::InvalidState)?;

    if now_ms - state.issued_at > STATE_TTL_SECONDS * 1_000 {
        return Err(AppError::ExpiredState);
    }

    Ok(state)
}
