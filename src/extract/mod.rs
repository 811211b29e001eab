//! Extraction module for Web-Rollup
//!
//! This module decides which part of a fetched page is kept and produces the
//! normalized markup fragment handed to Markdown conversion:
//! - Resolving path overrides into a locator and exclude selectors
//! - Locating, pruning and serializing the content subtree
//! - Normalizing whitespace and line endings

mod content;
mod normalize;
mod overrides;

pub use content::{decode_document, extract, extract_page, ExtractError, ExtractedPage};
pub use normalize::normalize_fragment;
pub use overrides::{resolve, ResolvedRules};
