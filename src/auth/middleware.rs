//! Owner authentication for write-side endpoints
//!
//! Issued access tokens are provider tokens; the bridge stores nothing,
//! so every authenticated request re-validates the bearer token against
//! the identity provider and re-checks the owner login.

use axum::http::HeaderMap;

use crate::error::AppError;
use crate::AppState;

/// Pull the bearer token out of the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}

/// Require the request to be authenticated as the configured owner
///
/// # Errors
/// `Unauthorized` when the bearer token is missing, malformed, or
/// rejected by the provider; `Forbidden` when the authenticated login
/// is not the configured owner.
pub async fn require_owner(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    let token = extract_bearer_token(headers).ok_or(AppError::Unauthorized)?;

    let login = state.provider.fetch_login(&token).await?;
    if login != state.config.auth.owner_login {
        tracing::warn!(login = %login, "Authenticated identity is not the instance owner");
        return Err(AppError::Forbidden);
    }

    Ok(login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        let headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic abc123"));
        assert!(extract_bearer_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_none());
    }
}
