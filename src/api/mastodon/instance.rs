//! Instance endpoints

use axum::{extract::State, response::Json};

use crate::api::account_to_response;
use crate::api::dto::{InstanceResponse, InstanceStats};
use crate::error::AppError;
use crate::AppState;

/// GET /api/v1/instance
pub async fn instance(State(state): State<AppState>) -> Result<Json<InstanceResponse>, AppError> {
    let snapshot = state.snapshot.load().await?;

    let response = InstanceResponse {
        uri: state.config.server.domain.clone(),
        title: state.config.instance.title.clone(),
        short_description: state.config.instance.description.clone(),
        description: state.config.instance.description.clone(),
        email: state.config.instance.contact_email.clone(),
        version: format!("Amberfeed {}", env!("CARGO_PKG_VERSION")),
        languages: vec!["en".to_string()],
        registrations: false, // Single-user instance
        approval_required: false,
        invites_enabled: false,
        stats: InstanceStats {
            user_count: 1,
            status_count: snapshot.posts.len() as i64,
            domain_count: 0,
        },
        thumbnail: None,
        contact_account: Some(account_to_response(&snapshot.account, &state.config)),
    };

    Ok(Json(response))
}
