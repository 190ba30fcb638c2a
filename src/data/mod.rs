//! Snapshot data layer
//!
//! The snapshot is the only data source of the read path:
//! a single account plus its compiled posts, published as one
//! immutable document. Pagination over it is a pure function.

mod models;
mod pagination;

pub use models::{Account, Post, Snapshot, Visibility};
pub use pagination::{paginate, PageQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
