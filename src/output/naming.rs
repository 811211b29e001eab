//! Output file naming

use chrono::{DateTime, Local};
use std::collections::HashSet;
use url::Url;

/// Extension of every separate-mode file
pub const ROLLUP_EXTENSION: &str = ".rollup.md";

/// Makes a string safe to use as a file name stem
///
/// Every character outside `[A-Za-z0-9-_]` becomes `_`. Leading and
/// trailing `_` are then trimmed, and an empty result becomes `untitled`.
///
/// # Examples
///
/// ```
/// use web_rollup::output::sanitize;
///
/// assert_eq!(sanitize("Hello World"), "Hello_World");
/// assert_eq!(sanitize("Hello, World!"), "Hello__World");
/// assert_eq!(sanitize("???"), "untitled");
/// ```
pub fn sanitize(name: &str) -> String {
    let out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derives a file name stem from a URL's host and path
///
/// Returns None for URLs without a host.
///
/// ```
/// use web_rollup::output::url_file_stem;
///
/// assert_eq!(url_file_stem("http://example.com/page").as_deref(), Some("example_com_page"));
/// ```
pub fn url_file_stem(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(sanitize(&format!("{}{}", host, parsed.path())))
}

/// Default single-mode file name, stamped with the local time
pub fn default_single_file_name(now: DateTime<Local>) -> String {
    format!("web-rollup-{}.md", now.format("%Y%m%d-%H%M%S"))
}

/// Hands out unique separate-mode file names
///
/// The first claim of a stem gets `<stem>.rollup.md`; later claims get
/// `<stem>-2.rollup.md`, `<stem>-3.rollup.md` and so on.
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a file name for an already sanitized stem
    pub fn allocate(&mut self, stem: &str) -> String {
        let first = format!("{}{}", stem, ROLLUP_EXTENSION);
        if self.used.insert(first.clone()) {
            return first;
        }

        let mut n = 2usize;
        loop {
            let candidate = format!("{}-{}{}", stem, n, ROLLUP_EXTENSION);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
