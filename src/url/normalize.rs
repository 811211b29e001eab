use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a candidate URL into the key used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than HTTP and HTTPS
/// 3. Reject URLs without a host
/// 4. Remove the fragment (everything after #)
/// 5. Strip a single trailing slash from the serialized form
///
/// The host is lowercased by the parser. Query strings are kept as-is since
/// they frequently select distinct documentation pages.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(String)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse the URL or it is not crawlable
///
/// # Examples
///
/// ```
/// use web_rollup::url::normalize_url;
///
/// assert_eq!(normalize_url("http://Example.COM/docs/").unwrap(), "http://example.com/docs");
/// assert_eq!(normalize_url("http://example.com").unwrap(), "http://example.com");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<String> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    let serialized = String::from(url);
    Ok(match serialized.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => serialized,
    })
}
