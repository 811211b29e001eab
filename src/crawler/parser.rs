//! Link discovery on fetched pages
//!
//! Collects the hyperlink targets of a page as absolute HTTP(S) URLs, in
//! document order and without duplicates.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all followable links from an HTML page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// Fragments are removed from the resolved URLs, so `/page#a` and `/page#b`
/// are reported once.
///
/// # Example
///
/// ```
/// use url::Url;
/// use web_rollup::crawler::extract_links;
///
/// let html = r#"<a href="/page">Link</a><a href="mailto:a@b.c">Mail</a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base), vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(absolute) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        else {
            continue;
        };

        if seen.insert(absolute.clone()) {
            links.push(absolute);
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only and empty hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        extract_links(html, &base_url())
    }

    #[test]
    fn test_extract_absolute_link() {
        let found = links(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(found, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_links() {
        let found = links(r#"<a href="/root">Root</a><a href="sibling">Sibling</a>"#);
        assert_eq!(
            found,
            vec!["https://example.com/root", "https://example.com/docs/sibling"]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let found = links(
            r#"
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:alert(1)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="ftp://example.com/file">FTP</a>
            "#,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_skip_download_and_fragment_links() {
        let found = links(r##"<a href="/file.pdf" download>Get</a><a href="#section">Jump</a>"##);
        assert!(found.is_empty());
    }

    #[test]
    fn test_fragments_stripped_and_deduplicated() {
        let found = links(r#"<a href="/a#one">1</a><a href="/a#two">2</a><a href="/a">3</a>"#);
        assert_eq!(found, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_document_order_kept() {
        let found = links(r#"<a href="/z">z</a><a href="/b">b</a><a href="/m">m</a>"#);
        assert_eq!(
            found,
            vec![
                "https://example.com/z",
                "https://example.com/b",
                "https://example.com/m"
            ]
        );
    }
}
