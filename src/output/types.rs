//! Result and bundle types shared by the crawler and the aggregator

use crate::config::{OutputType, SiteSpec};
use std::fmt;
use std::sync::Arc;

/// Why a URL produced no content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// The run was cancelled while waiting for a rate limiter token
    RateLimiter,
    /// The page could not be fetched
    Fetch,
    /// The fetched bytes were not a readable document
    Parse,
    /// No content could be located, or a selector was invalid
    Extraction,
    /// The run was cancelled while the page was being fetched
    Cancelled,
}

impl FailureKind {
    /// Returns true for failures caused by run cancellation
    ///
    /// These are dropped from the output without being reported as errors.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::RateLimiter | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimiter => "rate-limiter",
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::Extraction => "extraction",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of fetching and extracting one URL
///
/// Created once by the crawl worker that processed the URL and never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub enum ExtractionResult {
    Ok {
        url: String,
        /// Site the URL was crawled for
        site: Arc<SiteSpec>,
        /// First allowed path of the site prefixing the URL path
        allowed_path: Option<String>,
        title: Option<String>,
        /// Extracted HTML fragment; may be empty
        content: String,
    },
    Err {
        url: String,
        kind: FailureKind,
        detail: String,
    },
}

impl ExtractionResult {
    /// Builds a failed result
    pub fn failed(url: impl Into<String>, kind: FailureKind, detail: impl fmt::Display) -> Self {
        Self::Err {
            url: url.into(),
            kind,
            detail: detail.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Ok { url, .. } | Self::Err { url, .. } => url,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Failure kind, or None for a successful result
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Ok { .. } => None,
            Self::Err { kind, .. } => Some(*kind),
        }
    }
}

/// One converted page inside an output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub url: String,
    pub markdown: String,
}

/// One file of the output bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    /// File name relative to the output directory
    pub file_name: String,

    /// Sections in output order
    pub sections: Vec<Section>,
}

/// Header line introducing each section
pub const SECTION_HEADER_PREFIX: &str = "# ::: Content from ";

/// Separator placed between sections
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

impl OutputDocument {
    /// Renders the document text
    ///
    /// Every section is introduced by `# ::: Content from <url>`, and
    /// sections are separated by a `---` line.
    pub fn render(&self) -> String {
        let mut text = self
            .sections
            .iter()
            .map(|section| {
                format!(
                    "{}{}\n\n{}",
                    SECTION_HEADER_PREFIX,
                    section.url,
                    section.markdown.trim()
                )
            })
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR);
        text.push('\n');
        text
    }
}

/// Final artifact of a run: one or more documents ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBundle {
    pub mode: OutputType,
    pub documents: Vec<OutputDocument>,
}

impl OutputBundle {
    /// Returns true if the bundle holds no sections at all
    pub fn is_empty(&self) -> bool {
        self.documents.iter().all(|doc| doc.sections.is_empty())
    }

    /// Total number of sections across all documents
    pub fn section_count(&self) -> usize {
        self.documents.iter().map(|doc| doc.sections.len()).sum()
    }
}
