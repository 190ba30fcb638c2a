//! Timeline endpoints

use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::api::post_to_response;
use crate::api::dto::StatusResponse;
use crate::data::{paginate, PageQuery};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::AppState;

/// GET /api/v1/timelines/public
///
/// Loads the snapshot fresh and applies the pagination engine to it.
/// The snapshot is the unit of consistency: the whole request pages
/// over this one load.
pub async fn public_timeline(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<StatusResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/api/v1/timelines/public"])
        .start_timer();

    let snapshot = state.snapshot.load().await?;
    let account = snapshot.account;
    let page = paginate(snapshot.posts, &params);

    let responses: Vec<StatusResponse> = page
        .iter()
        .map(|post| post_to_response(post, &account, &state.config))
        .collect();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/v1/timelines/public", "200"])
        .inc();

    Ok(Json(responses))
}
