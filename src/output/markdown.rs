//! HTML to Markdown conversion

use thiserror::Error;

/// Error returned when a fragment cannot be converted
#[derive(Debug, Error)]
#[error("Markdown conversion failed: {0}")]
pub struct ConvertError(pub String);

/// Converts extracted HTML fragments to Markdown
pub trait MarkdownConverter: Send + Sync {
    fn convert(&self, html: &str) -> Result<String, ConvertError>;
}

/// Converter backed by the `htmd` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmdConverter;

impl MarkdownConverter for HtmdConverter {
    fn convert(&self, html: &str) -> Result<String, ConvertError> {
        if html.trim().is_empty() {
            return Ok(String::new());
        }

        htmd::convert(html)
            .map(|markdown| markdown.trim().to_string())
            .map_err(|e| ConvertError(e.to_string()))
    }
}
