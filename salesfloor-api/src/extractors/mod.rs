//! Custom Axum extractors.
//!
//! Every rejection renders as an [`ApiError`](crate::error::ApiError) body.

pub mod json;
pub mod path_id;

pub use json::{ApiJson, ApiQuery, OptionalApiJson};
pub use path_id::PathId;
