//! Cursor-based pagination over the snapshot's post list
//!
//! A pure function of (list, cursors, limit): no I/O, never fails.
//! The list is newest-first; cursors are post ids and select a window
//! by list position, matching Mastodon's `max_id`/`since_id`/`min_id`
//! semantics.

use serde::Deserialize;

use super::models::Post;

/// Page size used when `limit` is absent or malformed
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Hard cap on the page size
pub const MAX_PAGE_SIZE: usize = 40;

/// Pagination query parameters
///
/// `limit` is accepted as a raw string so that a malformed value
/// degrades to the default instead of failing query extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub max_id: Option<String>,
    pub since_id: Option<String>,
    pub min_id: Option<String>,
}

impl PageQuery {
    /// Effective page size: parsed `limit` clamped to [1, MAX_PAGE_SIZE],
    /// defaulting when absent or non-numeric.
    pub fn page_size(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|limit| limit.clamp(1, MAX_PAGE_SIZE as i64) as usize)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

fn position_of(posts: &[Post], id: &str) -> Option<usize> {
    posts.iter().position(|post| post.id == id)
}

/// Compute the visible page of a newest-first post list.
///
/// Cursor precedence: `max_id`, then `since_id`, then `min_id`; only the
/// first present-and-found cursor is honored, the rest are ignored. A
/// cursor id that is not in the list (stale client cursor after a
/// republish) filters nothing.
///
/// `max_id` keeps the posts strictly older than the referenced post.
/// `since_id` keeps the posts strictly newer. `min_id` also keeps the
/// strictly newer posts but reverses them, so the page grows upward from
/// the reference point (oldest of the kept subset first).
pub fn paginate(posts: Vec<Post>, query: &PageQuery) -> Vec<Post> {
    let mut window = posts;

    if let Some(position) = query
        .max_id
        .as_deref()
        .and_then(|id| position_of(&window, id))
    {
        window.drain(..=position);
    } else if let Some(position) = query
        .since_id
        .as_deref()
        .and_then(|id| position_of(&window, id))
    {
        window.truncate(position);
    } else if let Some(position) = query
        .min_id
        .as_deref()
        .and_then(|id| position_of(&window, id))
    {
        window.truncate(position);
        window.reverse();
    }

    window.truncate(query.page_size());
    window
}
