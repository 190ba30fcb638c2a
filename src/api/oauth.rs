//! OAuth endpoints

use axum::{
    routing::{get, post},
    Router,
};

use super::mastodon::apps::{authorize, create_token, provider_callback};
use crate::AppState;

/// Create OAuth router
///
/// These routes do NOT require authentication (they provide
/// authentication). The callback is called by the identity provider's
/// redirect, not by clients.
pub fn oauth_router() -> Router<AppState> {
    Router::new()
        .route("/authorize", get(authorize))
        .route("/provider/callback", get(provider_callback))
        .route("/token", post(create_token))
}
