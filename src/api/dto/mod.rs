//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation.

pub mod engagement;
pub mod health;
pub mod listings;
pub mod pagination;
pub mod rankings;
