use crate::config::SiteSpec;
use crate::{UrlError, UrlResult};
use url::Url;

/// Host and path rules a URL must satisfy to be crawled for one site
///
/// A URL is allowed when it:
/// - has the same host and port as the site's base URL
/// - matches at least one allowed path prefix (when any are declared)
/// - matches no excluded path prefix
#[derive(Debug, Clone)]
pub struct SitePolicy {
    host: String,
    port: Option<u16>,
    allowed_paths: Vec<String>,
    exclude_paths: Vec<String>,
}

impl SitePolicy {
    /// Builds the policy for a site
    ///
    /// # Errors
    ///
    /// Returns `UrlError` when the site's base URL cannot be parsed or has no host.
    pub fn new(site: &SiteSpec) -> UrlResult<Self> {
        let base = Url::parse(&site.base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        let host = base.host_str().ok_or(UrlError::MissingHost)?.to_string();

        Ok(Self {
            host,
            port: base.port_or_known_default(),
            allowed_paths: site.allowed_paths.clone(),
            exclude_paths: site.exclude_paths.clone(),
        })
    }

    /// Returns true if the URL may be scheduled for this site
    pub fn allows(&self, url: &Url) -> bool {
        if url.host_str() != Some(self.host.as_str()) || url.port_or_known_default() != self.port
        {
            return false;
        }

        let path = url.path();

        if !self.allowed_paths.is_empty()
            && !self
                .allowed_paths
                .iter()
                .any(|allowed| path.starts_with(allowed.as_str()))
        {
            return false;
        }

        !self
            .exclude_paths
            .iter()
            .any(|excluded| path.starts_with(excluded.as_str()))
    }

    /// Returns the first allowed path prefixing the URL's path
    pub fn matching_allowed_path(&self, url: &Url) -> Option<&str> {
        self.allowed_paths
            .iter()
            .find(|allowed| url.path().starts_with(allowed.as_str()))
            .map(String::as_str)
    }
}

/// Convenience check for a URL string against a site
///
/// Unparseable URLs and sites are never allowed.
///
/// # Examples
///
/// ```
/// use web_rollup::config::SiteSpec;
/// use web_rollup::url::is_allowed_url;
///
/// let site = SiteSpec {
///     allowed_paths: vec!["/blog".to_string()],
///     ..SiteSpec::new("https://example.com")
/// };
/// assert!(is_allowed_url("https://example.com/blog/post", &site));
/// assert!(!is_allowed_url("https://example.com/shop", &site));
/// ```
pub fn is_allowed_url(url_str: &str, site: &SiteSpec) -> bool {
    let Ok(url) = Url::parse(url_str) else {
        return false;
    };

    SitePolicy::new(site)
        .map(|policy| policy.allows(&url))
        .unwrap_or(false)
}
