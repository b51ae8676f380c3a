//! In-process repository implementations.
//!
//! Selected with `STORAGE_BACKEND=memory`. Data lives for the lifetime of the
//! process, which makes these stores suitable for demos and HTTP tests that
//! should not need PostgreSQL.
//!
//! - [`InMemoryListingRepository`]
//! - [`InMemoryLikeRepository`]
//! - [`InMemoryCommentRepository`]

mod comment_store;
mod like_store;
mod listing_store;

pub use comment_store::InMemoryCommentRepository;
pub use like_store::InMemoryLikeRepository;
pub use listing_store::InMemoryListingRepository;
