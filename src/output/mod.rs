//! Output module for Web-Rollup
//!
//! This module turns the result stream of a run into files:
//! - Result and bundle types shared with the crawler
//! - Markdown conversion of extracted fragments
//! - Aggregation into single or separate documents, with file naming
//! - Writing the bundle and reporting run statistics

mod aggregate;
mod markdown;
mod naming;
mod types;
mod writer;
pub mod stats;

pub use aggregate::{build_bundle, BundleOptions};
pub use markdown::{ConvertError, HtmdConverter, MarkdownConverter};
pub use naming::{default_single_file_name, sanitize, url_file_stem, NameAllocator, ROLLUP_EXTENSION};
pub use stats::{log_statistics, RunStats};
pub use types::{
    ExtractionResult, FailureKind, OutputBundle, OutputDocument, Section, SECTION_HEADER_PREFIX,
    SECTION_SEPARATOR,
};
pub use writer::{write_bundle, WriteError};
