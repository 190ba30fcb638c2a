//! Mastodon API compatible endpoints
//!
//! Implements the subset of the Mastodon API a read-mostly single-user
//! instance needs for client app compatibility.
//! See: https://docs.joinmastodon.org/api/

use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};

use crate::error::AppError;
use crate::AppState;

pub mod accounts;
pub mod apps;
pub mod instance;
pub mod statuses;
pub mod timelines;

/// Create Mastodon API router
///
/// Everything here is public except the write path and
/// `verify_credentials`, which re-validate the bearer token against
/// the identity provider inside the handler.
pub fn mastodon_api_router() -> Router<AppState> {
    Router::new()
        // Instance information is public
        .route("/v1/instance", get(instance::instance))
        // App registration is public
        .route("/v1/apps", post(apps::create_app))
        // Public timeline
        .route("/v1/timelines/public", get(timelines::public_timeline))
        // Account views
        .route(
            "/v1/accounts/verify_credentials",
            get(accounts::verify_credentials),
        )
        .route("/v1/accounts/:id", get(accounts::get_account))
        .route("/v1/accounts/:id/statuses", get(accounts::account_statuses))
        // Statuses
        .route("/v1/statuses", post(statuses::create_status))
        .route("/v1/statuses/:id", get(statuses::get_status))
}

/// Parse a request body as JSON or form-encoded, by content type
///
/// OAuth clients legitimately send either encoding to the token and
/// app registration endpoints.
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<T, AppError> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/json") {
        return serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("invalid JSON body: {}", e)));
    }

    let mut fields = serde_json::Map::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        fields.insert(
            key.into_owned(),
            serde_json::Value::String(value.into_owned()),
        );
    }
    serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| AppError::Validation(format!("invalid form body: {}", e)))
}
