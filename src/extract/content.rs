//! Content extraction from rendered pages
//!
//! Extraction keeps the first element matching the content locator (falling
//! back to the document body), removes every descendant matching an exclude
//! selector, and returns the normalized inner markup of what remains.

use crate::extract::normalize::normalize_fragment;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors that can occur while extracting content from a page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The byte stream could not be read as a document at all
    #[error("HTML parse error: {0}")]
    Parse(String),

    /// Neither the locator nor the document body matched anything
    #[error("no content")]
    NoContent,

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Content and metadata extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    /// The page title (from the <title> tag), if present and non-blank
    pub title: Option<String>,

    /// Normalized inner markup of the located content; may be empty
    pub content: String,
}

/// Decodes a fetched byte stream into document text
///
/// Tag soup is fine; what is rejected here is input that is not text at all:
/// invalid UTF-8 or embedded NUL bytes.
pub fn decode_document(body: &[u8]) -> Result<&str, ExtractError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| ExtractError::Parse(format!("document is not valid UTF-8: {}", e)))?;

    if text.contains('\0') {
        return Err(ExtractError::Parse(
            "document contains NUL bytes".to_string(),
        ));
    }

    Ok(text)
}

/// Extracts the located content of a page
///
/// # Arguments
///
/// * `html` - The page HTML
/// * `locator` - CSS selector of the content to keep; blank selects the body
/// * `exclude_selectors` - CSS selectors removed from the kept content
///
/// # Returns
///
/// * `Ok(String)` - Normalized inner markup (empty if everything was excluded)
/// * `Err(ExtractError)` - No content could be located or a selector is invalid
///
/// # Example
///
/// ```
/// use web_rollup::extract::extract;
///
/// let html = r#"<main><p>ok</p><div class="ads">x</div></main>"#;
/// let content = extract(html, "main", &[".ads".to_string()]).unwrap();
/// assert_eq!(content, "<p>ok</p>");
/// ```
pub fn extract(
    html: &str,
    locator: &str,
    exclude_selectors: &[String],
) -> Result<String, ExtractError> {
    extract_page(html, locator, exclude_selectors).map(|page| page.content)
}

/// Extracts the located content of a page together with its title
pub fn extract_page(
    html: &str,
    locator: &str,
    exclude_selectors: &[String],
) -> Result<ExtractedPage, ExtractError> {
    let mut document = Html::parse_document(html);
    let title = extract_title(&document);

    let body_selector = parse_selector("body")?;
    let locator_selector = if locator.trim().is_empty() {
        None
    } else {
        Some(parse_selector(locator)?)
    };

    let located = locator_selector
        .as_ref()
        .and_then(|selector| document.select(selector).next());

    let root_id = match located {
        Some(element) => element.id(),
        None => {
            if locator_selector.is_some() {
                tracing::debug!(
                    "No content found with selector '{}', falling back to body",
                    locator
                );
            }
            document
                .select(&body_selector)
                .next()
                .ok_or(ExtractError::NoContent)?
                .id()
        }
    };

    // Collect first, then detach: the tree cannot be mutated while selecting
    let mut excluded = Vec::new();
    if let Some(root) = document.tree.get(root_id).and_then(ElementRef::wrap) {
        for exclude in exclude_selectors {
            let selector = parse_selector(exclude)?;
            excluded.extend(
                root.select(&selector)
                    .map(|element| element.id())
                    .filter(|id| *id != root_id),
            );
        }
    }

    for id in excluded {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let inner = document
        .tree
        .get(root_id)
        .and_then(ElementRef::wrap)
        .map(|root| root.inner_html())
        .ok_or(ExtractError::NoContent)?;

    Ok(ExtractedPage {
        title,
        content: normalize_fragment(&inner),
    })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
