use crate::config::types::{Config, PathOverride, ScrapeSettings, SiteSpec};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Upper bound for the worker pool size
const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_scrape_settings(&config.scrape)?;
    validate_output(config)?;

    if config.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be configured".to_string(),
        ));
    }

    validate_sites(&config.sites)
}

/// Validates a list of sites independently of the rest of the configuration
pub fn validate_sites(sites: &[SiteSpec]) -> ConfigResult<()> {
    for site in sites {
        validate_site(site)?;
    }
    Ok(())
}

/// Validates rate limiting and worker settings
fn validate_scrape_settings(settings: &ScrapeSettings) -> Result<(), ConfigError> {
    if let Some(rate) = settings.requests_per_second {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "requests_per_second must be positive, got {}",
                rate
            )));
        }
    }

    if settings.burst_limit == Some(0) {
        return Err(ConfigError::Validation(
            "burst_limit must be positive, got 0".to_string(),
        ));
    }

    if let Some(workers) = settings.max_workers {
        if !(1..=MAX_WORKERS).contains(&workers) {
            return Err(ConfigError::Validation(format!(
                "max_workers must be between 1 and {}, got {}",
                MAX_WORKERS, workers
            )));
        }
    }

    Ok(())
}

/// Validates output settings
fn validate_output(config: &Config) -> Result<(), ConfigError> {
    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    if let Some(name) = &config.single_file_name {
        if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "single_file_name must be a plain file name, got '{}'",
                name
            )));
        }
    }

    Ok(())
}

/// Validates one site entry
fn validate_site(site: &SiteSpec) -> Result<(), ConfigError> {
    if site.base_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "base_url must be specified for each site".to_string(),
        ));
    }

    let url = Url::parse(&site.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", site.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' must use HTTP or HTTPS",
            site.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' has no host",
            site.base_url
        )));
    }

    for path in site.allowed_paths.iter().chain(&site.exclude_paths) {
        validate_path_prefix(path, &site.base_url)?;
    }

    validate_selectors(&site.css_locator, &site.exclude_selectors)?;

    for path_override in &site.path_overrides {
        validate_override(path_override, &site.base_url)?;
    }

    Ok(())
}

/// Validates a path override entry
fn validate_override(path_override: &PathOverride, base_url: &str) -> Result<(), ConfigError> {
    validate_path_prefix(&path_override.path, base_url)?;
    validate_selectors(&path_override.css_locator, &path_override.exclude_selectors)
}

/// Path prefixes are compared against URL paths, which always start with '/'
fn validate_path_prefix(path: &str, base_url: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "Path '{}' for site '{}' must start with '/'",
            path, base_url
        )));
    }
    Ok(())
}

/// Checks that the locator (when set) and every exclude selector parse
fn validate_selectors(locator: &str, excludes: &[String]) -> Result<(), ConfigError> {
    if !locator.trim().is_empty() {
        validate_selector(locator)?;
    }
    for selector in excludes {
        validate_selector(selector)?;
    }
    Ok(())
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{FetcherConfig, OutputType};

    fn create_test_config(sites: Vec<SiteSpec>) -> Config {
        Config {
            output_type: OutputType::Separate,
            output_dir: "output".to_string(),
            single_file_name: None,
            scrape: ScrapeSettings::default(),
            timeout_secs: None,
            fetcher: FetcherConfig::default(),
            sites,
        }
    }

    #[test]
    fn test_valid_config() {
        let config = create_test_config(vec![SiteSpec::new("https://example.com")]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_no_sites() {
        let config = create_test_config(vec![]);
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_base_url() {
        let config = create_test_config(vec![SiteSpec::new("")]);
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_scheme() {
        let config = create_test_config(vec![SiteSpec::new("ftp://example.com")]);
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rate_must_be_positive() {
        let mut config = create_test_config(vec![SiteSpec::new("https://example.com")]);
        config.scrape.requests_per_second = Some(0.0);
        assert!(validate(&config).is_err());

        config.scrape.requests_per_second = Some(f64::NAN);
        assert!(validate(&config).is_err());

        config.scrape.requests_per_second = Some(0.5);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_burst_must_be_positive() {
        let mut config = create_test_config(vec![SiteSpec::new("https://example.com")]);
        config.scrape.burst_limit = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_worker_bounds() {
        let mut config = create_test_config(vec![SiteSpec::new("https://example.com")]);
        config.scrape.max_workers = Some(0);
        assert!(validate(&config).is_err());
        config.scrape.max_workers = Some(65);
        assert!(validate(&config).is_err());
        config.scrape.max_workers = Some(8);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_paths_need_leading_slash() {
        let site = SiteSpec {
            allowed_paths: vec!["docs".to_string()],
            ..SiteSpec::new("https://example.com")
        };
        assert!(validate_sites(&[site]).is_err());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let site = SiteSpec {
            css_locator: "main[".to_string(),
            ..SiteSpec::new("https://example.com")
        };
        assert!(matches!(
            validate_sites(&[site]),
            Err(ConfigError::InvalidSelector(_))
        ));

        let site = SiteSpec {
            path_overrides: vec![PathOverride {
                path: "/blog".to_string(),
                css_locator: String::new(),
                exclude_selectors: vec!["..ads".to_string()],
            }],
            ..SiteSpec::new("https://example.com")
        };
        assert!(validate_sites(&[site]).is_err());
    }

    #[test]
    fn test_single_file_name_must_be_plain() {
        let mut config = create_test_config(vec![SiteSpec::new("https://example.com")]);
        config.single_file_name = Some("nested/out.md".to_string());
        assert!(validate(&config).is_err());
    }
}
