use serde::Deserialize;
use std::num::NonZeroU32;

/// Default sustained request rate when the configuration leaves it unset
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 1.0;

/// Default burst capacity when the configuration leaves it unset
pub const DEFAULT_BURST_LIMIT: u32 = 3;

/// Default size of the crawl worker pool
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Default per-request timeout for the HTTP fetcher (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for Web-Rollup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// How the output bundle is laid out
    #[serde(default)]
    pub output_type: OutputType,

    /// Directory the bundle is written into
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File name used in single mode (a timestamped name when absent)
    #[serde(default)]
    pub single_file_name: Option<String>,

    /// Rate limiting and worker pool settings
    #[serde(flatten)]
    pub scrape: ScrapeSettings,

    /// Whole-run deadline, after which the crawl is cancelled
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// HTTP fetcher settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Crawl targets
    #[serde(default)]
    pub sites: Vec<SiteSpec>,
}

fn default_output_dir() -> String {
    "output".to_string()
}

/// Output bundle layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// One document containing every page
    Single,
    /// One document per page group
    #[default]
    Separate,
}

impl std::str::FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "separate" => Ok(Self::Separate),
            other => Err(format!(
                "output type must be 'single' or 'separate', got '{}'",
                other
            )),
        }
    }
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Separate => write!(f, "separate"),
        }
    }
}

/// Rate limiting settings as they appear in the configuration file
///
/// Both rate fields are optional; [`ScrapeSettings::resolve`] applies the
/// documented defaults once, before the crawl starts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScrapeSettings {
    /// Sustained fetch-start rate (requests per second)
    #[serde(default)]
    pub requests_per_second: Option<f64>,

    /// Maximum number of fetches that may start back to back
    #[serde(default)]
    pub burst_limit: Option<u32>,

    /// Number of concurrent crawl workers
    #[serde(default)]
    pub max_workers: Option<usize>,
}

/// Rate limiting settings with defaults applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSettings {
    pub requests_per_second: f64,
    pub burst: NonZeroU32,
    pub workers: usize,
}

impl ScrapeSettings {
    /// Applies defaults to unset fields
    ///
    /// Values are expected to have passed validation; a zero burst still
    /// falls back to the default rather than failing here.
    pub fn resolve(&self) -> RateSettings {
        let burst = self
            .burst_limit
            .and_then(NonZeroU32::new)
            .or_else(|| NonZeroU32::new(DEFAULT_BURST_LIMIT))
            .unwrap_or(NonZeroU32::MIN);

        RateSettings {
            requests_per_second: self
                .requests_per_second
                .unwrap_or(DEFAULT_REQUESTS_PER_SECOND),
            burst,
            workers: self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS),
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// User agent header sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// One crawl target and its extraction/traversal rules
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteSpec {
    /// Base URL of the site; also the seed when no allowed paths are declared
    pub base_url: String,

    /// Default content locator (CSS selector); blank selects the body
    #[serde(default)]
    pub css_locator: String,

    /// Default selectors removed from the extracted content
    #[serde(default)]
    pub exclude_selectors: Vec<String>,

    /// Path prefixes a URL must match one of (when non-empty)
    #[serde(default)]
    pub allowed_paths: Vec<String>,

    /// Path prefixes that are never crawled
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Number of link-following hops from the seeds
    #[serde(default)]
    pub max_depth: u32,

    /// Prefix used for naming this site's output files
    #[serde(default)]
    pub file_name_prefix: Option<String>,

    /// Path-specific extraction rules, first match wins
    #[serde(default)]
    pub path_overrides: Vec<PathOverride>,
}

impl SiteSpec {
    /// Creates a site with only a base URL set
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Returns the seed URLs for this site
    ///
    /// A site is seeded either by its bare base URL, or by the base URL joined
    /// with each allowed path.
    pub fn seed_urls(&self) -> Vec<String> {
        if self.allowed_paths.is_empty() {
            return vec![self.base_url.clone()];
        }

        let base = self.base_url.trim_end_matches('/');
        self.allowed_paths
            .iter()
            .map(|path| {
                if path.starts_with('/') {
                    format!("{}{}", base, path)
                } else {
                    format!("{}/{}", base, path)
                }
            })
            .collect()
    }
}

/// Path-specific extraction rule
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathOverride {
    /// URL path prefix this override applies to
    pub path: String,

    /// Locator replacing the site default when non-empty
    #[serde(default)]
    pub css_locator: String,

    /// Exclude selectors; always replace the site default, even when empty
    #[serde(default)]
    pub exclude_selectors: Vec<String>,
}
