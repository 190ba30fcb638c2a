//! Account endpoints
//!
//! There is exactly one account: the snapshot's owner. Lookups by any
//! other id are 404s.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};

use crate::api::{account_to_response, post_to_response};
use crate::api::dto::{AccountResponse, StatusResponse};
use crate::auth::require_owner;
use crate::data::{paginate, PageQuery};
use crate::error::AppError;
use crate::AppState;

/// GET /api/v1/accounts/verify_credentials
///
/// Clients call this right after the token exchange; it re-validates
/// the bearer token against the identity provider the same way the
/// write path does.
pub async fn verify_credentials(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountResponse>, AppError> {
    require_owner(&state, &headers).await?;

    let snapshot = state.snapshot.load().await?;
    Ok(Json(account_to_response(&snapshot.account, &state.config)))
}

/// GET /api/v1/accounts/:id
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let snapshot = state.snapshot.load().await?;

    if snapshot.account.id != id {
        return Err(AppError::NotFound);
    }

    Ok(Json(account_to_response(&snapshot.account, &state.config)))
}

/// GET /api/v1/accounts/:id/statuses
///
/// The owner's posts through the same pagination engine as the public
/// timeline.
pub async fn account_statuses(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<StatusResponse>>, AppError> {
    let snapshot = state.snapshot.load().await?;

    if snapshot.account.id != id {
        return Err(AppError::NotFound);
    }

    let account = snapshot.account;
    let page = paginate(snapshot.posts, &params);

    let responses: Vec<StatusResponse> = page
        .iter()
        .map(|post| post_to_response(post, &account, &state.config))
        .collect();

    Ok(Json(responses))
}
