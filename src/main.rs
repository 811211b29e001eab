//! Web-Rollup main entry point
//!
//! This is the command-line interface for crawling documentation sites into
//! Markdown bundles.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use web_rollup::config::{parse_config, validate, Config, OutputType, SiteSpec, DEFAULT_CONFIG_PATH};
use web_rollup::crawler::{run, HttpFetcher};
use web_rollup::output::HtmdConverter;

/// Web-Rollup: crawl websites into Markdown
///
/// Web-Rollup crawls the configured sites under a shared rate limit, keeps
/// the content region of every page, converts it to Markdown and writes one
/// document, or one document per page group.
#[derive(Parser, Debug)]
#[command(name = "web-rollup")]
#[command(version)]
#[command(about = "Crawl websites into Markdown bundles", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults to rollup.toml unless --url is given)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Crawl this URL instead of the configured sites (repeatable)
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// CSS selector of the content to keep
    #[arg(long, value_name = "SELECTOR")]
    css: Option<String>,

    /// CSS selector to remove from the content (repeatable)
    #[arg(long = "exclude", value_name = "SELECTOR")]
    excludes: Vec<String>,

    /// Number of link-following hops from the seed URLs
    #[arg(long, value_name = "N")]
    depth: Option<u32>,

    /// Output layout: single or separate
    #[arg(long, value_name = "TYPE")]
    output_type: Option<OutputType>,

    /// Directory the output is written into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Sustained request rate (requests per second)
    #[arg(long, value_name = "RATE")]
    rps: Option<f64>,

    /// Number of requests that may start back to back
    #[arg(long, value_name = "N")]
    burst: Option<u32>,

    /// Number of concurrent crawl workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Cancel the run after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(&cli)?;
    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_run(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("web_rollup=info,warn"),
            1 => EnvFilter::new("web_rollup=debug,info"),
            2 => EnvFilter::new("web_rollup=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or starts from defaults for ad-hoc URLs
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None if cli.urls.is_empty() => PathBuf::from(DEFAULT_CONFIG_PATH),
        None => return parse_config("").context("Failed to build default configuration"),
    };

    if !path.exists() {
        bail!(
            "Configuration file {} not found (pass a CONFIG path or --url)",
            path.display()
        );
    }

    tracing::info!("Loading configuration from: {}", path.display());
    read_config(&path)
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.urls.is_empty() {
        config.sites = cli.urls.iter().map(SiteSpec::new).collect();
    }

    for site in &mut config.sites {
        if let Some(css) = &cli.css {
            site.css_locator = css.clone();
        }
        if !cli.excludes.is_empty() {
            site.exclude_selectors = cli.excludes.clone();
        }
        if let Some(depth) = cli.depth {
            site.max_depth = depth;
        }
    }

    if let Some(output_type) = cli.output_type {
        config.output_type = output_type;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(rps) = cli.rps {
        config.scrape.requests_per_second = Some(rps);
    }
    if let Some(burst) = cli.burst {
        config.scrape.burst_limit = Some(burst);
    }
    if let Some(workers) = cli.workers {
        config.scrape.max_workers = Some(workers);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
}

/// Handles the --dry-run mode: shows the resolved plan
fn handle_dry_run(config: &Config) {
    let settings = config.scrape.resolve();

    println!("=== Web-Rollup Dry Run ===\n");

    println!("Scrape Settings:");
    println!("  Requests per second: {}", settings.requests_per_second);
    println!("  Burst limit: {}", settings.burst);
    println!("  Workers: {}", settings.workers);
    if let Some(timeout) = config.timeout_secs {
        println!("  Timeout: {}s", timeout);
    }

    println!("\nOutput:");
    println!("  Type: {}", config.output_type);
    println!("  Directory: {}", config.output_dir);
    if let Some(name) = &config.single_file_name {
        println!("  Single file name: {}", name);
    }

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        println!("  - {} (max depth {})", site.base_url, site.max_depth);
        if !site.css_locator.is_empty() {
            println!("    locator: {}", site.css_locator);
        }
        if !site.exclude_selectors.is_empty() {
            println!("    excludes: {}", site.exclude_selectors.join(", "));
        }
        for path_override in &site.path_overrides {
            println!("    override: {}", path_override.path);
        }
        for seed in site.seed_urls() {
            println!("    * {}", seed);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.sites.iter().map(|s| s.seed_urls().len()).sum::<usize>()
    );
}

/// Handles the main run: crawl, aggregate and write
async fn handle_run(config: Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling run");
                cancel.cancel();
            }
        });
    }

    if let Some(secs) = config.timeout_secs {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!("Timeout of {}s reached, cancelling run", secs);
            cancel.cancel();
        });
    }

    let fetcher = Arc::new(HttpFetcher::new(config.fetcher.clone()));

    match run(&config, fetcher, &HtmdConverter, cancel).await {
        Ok(report) => {
            for path in report.files() {
                println!("{}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
