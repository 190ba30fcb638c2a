//! API layer
//!
//! HTTP handlers for:
//! - Mastodon API (for client apps)
//! - OAuth bridge endpoints
//! - Metrics (Prometheus)

mod converters;
mod dto;
pub mod mastodon;
pub mod metrics;
mod oauth;

pub use converters::*;
pub use dto::*;

pub use mastodon::mastodon_api_router;
pub use metrics::metrics_router;
pub use oauth::oauth_router;
