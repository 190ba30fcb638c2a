//! Status endpoints
//!
//! Reads come from the snapshot. The write path commits a new post
//! document through the content store; the post becomes visible only
//! after the external site build republishes the snapshot.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::parse_body;
use crate::api::post_to_response;
use crate::api::dto::StatusResponse;
use crate::auth::require_owner;
use crate::data::Visibility;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::AppState;

/// Status creation request
#[derive(Debug, Deserialize)]
pub struct CreateStatusRequest {
    pub status: Option<String>,
    pub visibility: Option<String>,
    pub sensitive: Option<bool>,
}

/// Render the post document committed to the content store
///
/// Fixed frontmatter shape; the site build parses it back out when it
/// compiles the next snapshot.
fn render_post_document(
    content: &str,
    visibility: Visibility,
    sensitive: bool,
    created_at: DateTime<Utc>,
) -> String {
    format!(
        "---\ndate: {}\nvisibility: {}\nsensitive: {}\n---\n\n{}\n",
        created_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        visibility.as_str(),
        sensitive,
        content
    )
}

/// GET /api/v1/statuses/:id
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let snapshot = state.snapshot.load().await?;

    let post = snapshot
        .posts
        .iter()
        .find(|post| post.id == id)
        .ok_or(AppError::NotFound)?;

    Ok(Json(post_to_response(
        post,
        &snapshot.account,
        &state.config,
    )))
}

/// POST /api/v1/statuses
///
/// # Steps
/// 1. Re-validate the bearer token against the identity provider and
///    re-check the owner login
/// 2. Render the post document and commit it through the content store
/// 3. Return a minimal synthesized status; the read snapshot is not
///    updated here
pub async fn create_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/api/v1/statuses"])
        .start_timer();

    if !state.config.auth.write_enabled {
        return Err(AppError::NotFound);
    }

    require_owner(&state, &headers).await?;

    let req: CreateStatusRequest = parse_body(&headers, &body)?;

    let content = req
        .status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation("status text is required".to_string()))?;
    let visibility = match req.visibility.as_deref() {
        Some(raw) => raw.parse::<Visibility>()?,
        None => Visibility::default(),
    };
    let sensitive = req.sensitive.unwrap_or(false);

    let created_at = Utc::now();
    let id = created_at.timestamp_millis().to_string();
    let document = render_post_document(content, visibility, sensitive, created_at);

    state
        .content
        .commit(&format!("{}.md", id), &document)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/api/v1/statuses", "201"])
        .inc();

    let response = serde_json::json!({
        "id": id,
        "created_at": created_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "content": content,
        "visibility": visibility.as_str(),
        "sensitive": sensitive,
        "uri": format!("{}/statuses/{}", state.config.server.base_url(), id),
        "url": format!("{}/statuses/{}", state.config.server.base_url(), id),
    });

    Ok((StatusCode::CREATED, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_document_has_fixed_frontmatter_shape() {
        let created_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let document =
            render_post_document("hello fediverse", Visibility::Unlisted, true, created_at);

        assert_eq!(
            document,
            "---\ndate: 2023-11-14T22:13:20Z\nvisibility: unlisted\nsensitive: true\n---\n\nhello fediverse\n"
        );
    }
}
