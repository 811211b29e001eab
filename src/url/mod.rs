//! URL handling module for Web-Rollup
//!
//! This module provides URL normalization for deduplication and the host/path
//! policy every scheduled URL must satisfy.

mod normalize;
mod policy;

// Re-export main functions
pub use normalize::normalize_url;
pub use policy::{is_allowed_url, SitePolicy};
