//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Shared fetch-start rate limiting
//! - The fetcher capability and its HTTP implementation
//! - Link discovery on fetched pages
//! - Per-site deduplication and the bounded worker pool
//! - Overall run coordination, from configuration to written bundle

mod coordinator;
mod fetcher;
mod frontier;
mod limiter;
mod parser;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{admit, CrawlTask, SiteCrawl, VisitedSet, WorkQueue};
pub use limiter::{RateLimitError, RateLimiter};
pub use parser::extract_links;

use crate::config::{validate, Config};
use crate::output::{
    build_bundle, default_single_file_name, log_statistics, write_bundle, BundleOptions,
    MarkdownConverter, RunStats,
};
use crate::RollupError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: RunStats,
    pub elapsed: Duration,
}

impl RunReport {
    /// Files written by the run
    pub fn files(&self) -> &[PathBuf] {
        &self.stats.files
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a run. It will:
/// 1. Validate the configuration and resolve rate settings
/// 2. Open the fetcher
/// 3. Crawl every site until the frontier is exhausted or `cancel` fires
/// 4. Close the fetcher
/// 5. Aggregate the results and write the output bundle
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `fetcher` - Fetch capability; opened and closed by this function
/// * `converter` - HTML to Markdown converter
/// * `cancel` - Cancellation signal (timeout or interrupt)
///
/// # Returns
///
/// * `Ok(RunReport)` - At least one page was written
/// * `Err(RollupError)` - Invalid configuration, a write failure, or no
///   content at all
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use web_rollup::config::load_config;
/// use web_rollup::crawler::{run, HttpFetcher};
/// use web_rollup::output::HtmdConverter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("rollup.toml"))?;
/// let fetcher = Arc::new(HttpFetcher::new(config.fetcher.clone()));
/// let report = run(&config, fetcher, &HtmdConverter, CancellationToken::new()).await?;
/// println!("{} files written", report.files().len());
/// # Ok(())
/// # }
/// ```
pub async fn run(
    config: &Config,
    fetcher: Arc<dyn Fetcher>,
    converter: &dyn MarkdownConverter,
    cancel: CancellationToken,
) -> crate::Result<RunReport> {
    validate(config)?;

    let start_time = Instant::now();
    let settings = config.scrape.resolve();
    tracing::info!(
        "Starting run: {} site(s), {} req/s, burst {}, {} workers",
        config.sites.len(),
        settings.requests_per_second,
        settings.burst,
        settings.workers
    );

    let coordinator = Coordinator::new(Arc::clone(&fetcher), &settings, cancel.clone())?;

    fetcher.open().await?;
    let crawled = coordinator.crawl(&config.sites).await;
    if let Err(e) = fetcher.close().await {
        tracing::warn!("Failed to close fetcher: {}", e);
    }
    let results = crawled?;

    if cancel.is_cancelled() {
        tracing::warn!("Run was cancelled; writing what was extracted so far");
    }

    let mut stats = RunStats::from_results(&results);

    let options = BundleOptions {
        mode: config.output_type,
        single_file_name: config
            .single_file_name
            .clone()
            .unwrap_or_else(|| default_single_file_name(chrono::Local::now())),
    };
    let bundle = build_bundle(results, &options, converter);

    if bundle.is_empty() {
        log_statistics(&stats, start_time.elapsed());
        return Err(RollupError::NoContent {
            attempted: stats.attempted,
        });
    }

    stats.sections_written = bundle.section_count();
    stats.files = write_bundle(&bundle, Path::new(&config.output_dir))?;

    let elapsed = start_time.elapsed();
    log_statistics(&stats, elapsed);

    Ok(RunReport { stats, elapsed })
}
