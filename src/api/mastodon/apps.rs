//! Apps and OAuth bridge endpoints
//!
//! App registration plus the three-legged bridge onto the external
//! identity provider. The bridge is stateless across requests: the
//! in-flight context travels in a signed `state` token, and the
//! provider access token doubles as the protocol's authorization code
//! so nothing has to be stored between the callback and the token
//! exchange.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use url::Url;

use super::parse_body;
use crate::api::dto::{AppResponse, TokenResponse};
use crate::auth::{sign_state, verify_state, BridgeState};
use crate::error::AppError;
use crate::AppState;

/// Fixed client credentials echoed to every registered app
///
/// The bridge performs no client authentication; the only
/// authorization decision is the owner-identity check at the
/// provider callback. The pair is public.
pub const CLIENT_ID: &str = "amberfeed";
pub const CLIENT_SECRET: &str = "amberfeed-public-client";

/// Scope string attached to every issued access token
const ISSUED_TOKEN_SCOPE: &str = "read write";

/// App registration request
#[derive(Debug, Deserialize)]
pub struct CreateAppRequest {
    pub client_name: String,
    pub redirect_uris: String,
    pub scopes: Option<String>,
    pub website: Option<String>,
}

/// OAuth authorize request query
#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub response_type: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
}

/// Query parameters from the provider callback
#[derive(Debug, Deserialize)]
pub struct ProviderCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// OAuth token request
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
}

/// 302 Found redirect for the browser hops (axum's `Redirect::to`
/// emits 303).
fn redirect_found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(axum::http::header::LOCATION, location.to_string())],
        (),
    )
        .into_response()
}

fn build_client_redirect_location(redirect_uri: &str, param: &str, value: &str) -> String {
    if let Ok(mut redirect) = Url::parse(redirect_uri) {
        let mut serializer =
            url::form_urlencoded::Serializer::new(redirect.query().unwrap_or("").to_string());
        serializer.append_pair(param, value);
        redirect.set_query(Some(&serializer.finish()));
        return redirect.to_string();
    }

    // Fallback for unexpected non-URL values.
    let separator = if redirect_uri.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        redirect_uri,
        separator,
        param,
        urlencoding::encode(value)
    )
}

/// POST /api/v1/apps
///
/// Any client may register. The response echoes the client's own name
/// and redirect URI with the fixed credential pair; nothing is stored.
pub async fn create_app(headers: HeaderMap, body: Bytes) -> Result<Json<AppResponse>, AppError> {
    let req: CreateAppRequest = parse_body(&headers, &body)?;

    if req.client_name.trim().is_empty() {
        return Err(AppError::Validation("client_name is required".to_string()));
    }
    if req.redirect_uris.trim().is_empty() {
        return Err(AppError::Validation(
            "redirect_uris is required".to_string(),
        ));
    }

    let response = AppResponse {
        id: Utc::now().timestamp_millis().to_string(),
        name: req.client_name,
        website: req.website,
        redirect_uri: req.redirect_uris,
        client_id: CLIENT_ID.to_string(),
        client_secret: CLIENT_SECRET.to_string(),
        vapid_key: None,
    };

    Ok(Json(response))
}

/// GET /oauth/authorize
///
/// Signs the in-flight context into a `state` token and bounces the
/// browser to the identity provider's authorization page.
pub async fn authorize(
    State(state): State<AppState>,
    Query(req): Query<AuthorizeRequest>,
) -> Result<Response, AppError> {
    let redirect_uri = req
        .redirect_uri
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation("redirect_uri is required".to_string()))?;

    let bridge_state = BridgeState::new(redirect_uri);
    let state_token = sign_state(&bridge_state, &state.config.auth.state_secret)?;

    let callback_uri = format!(
        "{}/oauth/provider/callback",
        state.config.server.base_url()
    );
    let location = state
        .provider
        .authorize_redirect(&callback_uri, &state_token)?;

    tracing::debug!(client_redirect_uri = %redirect_uri, "Redirecting to identity provider");
    Ok(redirect_found(&location))
}

/// GET /oauth/provider/callback
///
/// # Steps
/// 1. Verify the signed `state` (signature, then expiry window)
/// 2. Exchange the provider `code` for an access token
/// 3. Fetch the authenticated login and check it against the owner
/// 4. Redirect to the client's redirect URI with the provider token
///    as the protocol `code`
pub async fn provider_callback(
    State(state): State<AppState>,
    Query(query): Query<ProviderCallbackQuery>,
) -> Result<Response, AppError> {
    let state_token = query
        .state
        .as_deref()
        .ok_or_else(|| AppError::Validation("state is required".to_string()))?;
    let bridge_state = verify_state(state_token, &state.config.auth.state_secret)?;

    if query.error.is_some() {
        // The provider reported a denial; hand it back to the client.
        let location = build_client_redirect_location(
            &bridge_state.client_redirect_uri,
            "error",
            "access_denied",
        );
        return Ok(redirect_found(&location));
    }

    let code = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation("code is required".to_string()))?;

    let provider_token = state.provider.exchange_code(code).await?;
    let login = state.provider.fetch_login(&provider_token).await?;

    if login != state.config.auth.owner_login {
        tracing::warn!(login = %login, "Sign-in attempt by a non-owner identity");
        return Err(AppError::Forbidden);
    }

    let location = build_client_redirect_location(
        &bridge_state.client_redirect_uri,
        "code",
        &provider_token,
    );
    Ok(redirect_found(&location))
}

/// POST /oauth/token
///
/// The `code` is, by construction, the provider access token issued at
/// the callback step, so it is returned verbatim as the access token.
/// Owner validation already happened at the callback; this endpoint
/// exists for protocol-shape compatibility.
pub async fn create_token(
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TokenResponse>, AppError> {
    let req: TokenRequest = parse_body(&headers, &body)?;

    match req.grant_type.as_deref() {
        Some("authorization_code") => {}
        Some(other) => {
            return Err(AppError::InvalidGrant(format!(
                "grant_type '{}' is not supported",
                other
            )));
        }
        None => {
            return Err(AppError::InvalidGrant("grant_type is required".to_string()));
        }
    }

    let code = req
        .code
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::InvalidGrant("code is required".to_string()))?;

    Ok(Json(TokenResponse {
        access_token: code.to_string(),
        token_type: "Bearer".to_string(),
        scope: ISSUED_TOKEN_SCOPE.to_string(),
        created_at: Utc::now().timestamp(),
    }))
}
