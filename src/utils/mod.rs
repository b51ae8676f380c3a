//! Helper functions shared across layers.
//!
//! - [`id_generator`] - Random identifier generation and validation
//! - [`url_normalizer`] - Website and image URL normalization
//! - [`tags`] - Category and technology label cleanup

pub mod id_generator;
pub mod tags;
pub mod url_normalizer;
