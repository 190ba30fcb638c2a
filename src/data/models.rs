//! Snapshot data models
//!
//! These records are produced by the external site build and never
//! mutated at request time. The snapshot document is the unit of
//! consistency: each request loads it once and pages over that copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
    Direct,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Direct => "direct",
        }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}

impl std::str::FromStr for Visibility {
    type Err = crate::error::AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "unlisted" => Ok(Visibility::Unlisted),
            "private" => Ok(Visibility::Private),
            "direct" => Ok(Visibility::Direct),
            _ => Err(crate::error::AppError::Validation(
                "visibility must be one of: public, unlisted, private, direct".to_string(),
            )),
        }
    }
}

/// A compiled post
///
/// `id` is an opaque, monotonically sortable string assigned at
/// build time (millisecond timestamp of the source document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub sensitive: bool,
    pub content_html: String,
    #[serde(default)]
    pub replies_count: i64,
    #[serde(default)]
    pub reblogs_count: i64,
    #[serde(default)]
    pub favourites_count: i64,
}

/// The single content owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub header: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub statuses_count: i64,
}

/// The full published snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub account: Account,
    pub posts: Vec<Post>,
}

impl Snapshot {
    /// Enforce the newest-first ordering invariant
    ///
    /// Posts are ordered by `created_at` descending, ties broken by
    /// `id` descending. The site build already emits this order; the
    /// loader re-sorts so pagination's position arithmetic never
    /// depends on it.
    pub fn normalize(&mut self) {
        self.posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
    }
}
