//! Identity-bridging OAuth authentication
//!
//! Handles:
//! - Signed, client-carried bridge state
//! - Authenticated encryption for confidential state
//! - Identity provider (GitHub) exchange and lookup
//! - Owner re-validation on authenticated requests

pub mod crypto;
mod middleware;
mod provider;
pub mod state;

pub use middleware::{extract_bearer_token, require_owner};
pub use provider::ProviderClient;
pub use state::{sign_state, verify_state, verify_state_at, BridgeState, STATE_TTL_SECONDS};
