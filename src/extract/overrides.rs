use crate::config::SiteSpec;
use url::Url;

/// Locator and exclusions that apply to one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRules<'a> {
    /// Content locator; may be blank, meaning the document body
    pub locator: &'a str,

    /// Selectors removed from the located content
    pub exclude_selectors: &'a [String],
}

/// Resolves which locator and exclude selectors apply to a URL
///
/// The first path override, in declaration order, whose path is a prefix of
/// the URL's path wins. Its locator is used when non-empty (the site default
/// otherwise) and its exclude selectors are always used, so an override with
/// no exclusions suppresses the site-level ones. Without a matching override
/// the site defaults apply.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use web_rollup::config::{PathOverride, SiteSpec};
/// use web_rollup::extract::resolve;
///
/// let site = SiteSpec {
///     css_locator: "main".to_string(),
///     path_overrides: vec![PathOverride {
///         path: "/blog".to_string(),
///         css_locator: "article".to_string(),
///         exclude_selectors: vec![],
///     }],
///     ..SiteSpec::new("https://example.com")
/// };
///
/// let url = Url::parse("https://example.com/blog/post").unwrap();
/// assert_eq!(resolve(&url, &site).locator, "article");
/// ```
pub fn resolve<'a>(url: &Url, site: &'a SiteSpec) -> ResolvedRules<'a> {
    let path = url.path();

    match site
        .path_overrides
        .iter()
        .find(|path_override| path.starts_with(path_override.path.as_str()))
    {
        Some(path_override) => ResolvedRules {
            locator: if path_override.css_locator.is_empty() {
                &site.css_locator
            } else {
                &path_override.css_locator
            },
            exclude_selectors: &path_override.exclude_selectors,
        },
        None => ResolvedRules {
            locator: &site.css_locator,
            exclude_selectors: &site.exclude_selectors,
        },
    }
}
