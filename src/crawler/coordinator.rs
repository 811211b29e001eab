//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator seeds one frontier per site, runs a fixed pool of workers
//! over a shared work queue, and streams one [`ExtractionResult`] per fetched
//! URL through a results channel. The channel closes once every worker has
//! exited, which happens when no work is pending or the run is cancelled.
//!
//! Each worker drives its task through the same steps:
//! 1. Wait for a rate limiter token
//! 2. Fetch the page
//! 3. Resolve path overrides and extract the content
//! 4. Emit the result
//! 5. Discover links and admit them with one less hop of depth

use crate::config::{RateSettings, SiteSpec};
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::frontier::{admit, CrawlTask, SiteCrawl, WorkQueue};
use crate::crawler::limiter::RateLimiter;
use crate::extract::{decode_document, extract_page, resolve, ExtractError, ExtractedPage};
use crate::output::{ExtractionResult, FailureKind};
use crate::state::TaskState;
use crate::RollupError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Arc<dyn Fetcher>,
    limiter: RateLimiter,
    workers: usize,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetch and link discovery capability, already opened
    /// * `settings` - Resolved rate limiting and worker pool settings
    /// * `cancel` - Run-wide cancellation signal
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(RollupError)` - The rate settings are invalid
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        settings: &RateSettings,
        cancel: CancellationToken,
    ) -> Result<Self, RollupError> {
        Ok(Self {
            fetcher,
            limiter: RateLimiter::from_settings(settings)?,
            workers: settings.workers.max(1),
            cancel,
        })
    }

    /// Starts crawling the sites and returns the result stream
    ///
    /// Every site gets its own frontier and visited set; all sites share the
    /// rate limiter and the worker pool.
    ///
    /// # Errors
    ///
    /// Returns `RollupError::UrlError` if a site's base URL cannot be parsed.
    pub fn start(&self, sites: &[SiteSpec]) -> Result<mpsc::Receiver<ExtractionResult>, RollupError> {
        let queue = Arc::new(WorkQueue::new());

        for spec in sites {
            let site = Arc::new(SiteCrawl::new(spec.clone())?);
            let mut seeded = 0;

            for seed in spec.seed_urls() {
                if let Some(task) = admit(&site, &seed, spec.max_depth) {
                    queue.push(task);
                    seeded += 1;
                } else {
                    tracing::warn!("Seed {} rejected for site {}", seed, spec.base_url);
                }
            }

            tracing::info!(
                "Seeded {} URL(s) for {} (max depth {})",
                seeded,
                spec.base_url,
                spec.max_depth
            );
        }

        let (tx, rx) = mpsc::channel(self.workers * 4);
        // Cancelled by the run token, or by a worker once the receiver is gone
        let stop = self.cancel.child_token();

        for id in 0..self.workers {
            let worker = Worker {
                id,
                fetcher: Arc::clone(&self.fetcher),
                limiter: self.limiter.clone(),
                queue: Arc::clone(&queue),
                cancel: stop.clone(),
                results: tx.clone(),
            };
            tokio::spawn(worker.run());
        }

        Ok(rx)
    }

    /// Crawls the sites to completion and collects every result
    pub async fn crawl(&self, sites: &[SiteSpec]) -> Result<Vec<ExtractionResult>, RollupError> {
        let mut rx = self.start(sites)?;
        let mut results = Vec::new();

        while let Some(result) = rx.recv().await {
            results.push(result);
            if results.len() % 10 == 0 {
                tracing::info!("Progress: {} URLs processed", results.len());
            }
        }

        Ok(results)
    }
}

/// One member of the worker pool
struct Worker {
    id: usize,
    fetcher: Arc<dyn Fetcher>,
    limiter: RateLimiter,
    queue: Arc<WorkQueue>,
    cancel: CancellationToken,
    results: mpsc::Sender<ExtractionResult>,
}

impl Worker {
    async fn run(self) {
        tracing::debug!("Worker {} started", self.id);

        while let Some(mut task) = self.queue.next(&self.cancel).await {
            self.process(&mut task).await;
            self.queue.complete();
        }

        tracing::debug!("Worker {} finished", self.id);
    }

    async fn process(&self, task: &mut CrawlTask) {
        task.advance(TaskState::Scheduling);
        if let Err(e) = self.limiter.acquire(&self.cancel).await {
            task.advance(TaskState::Done);
            self.emit(ExtractionResult::failed(&task.url, FailureKind::RateLimiter, e))
                .await;
            return;
        }

        task.advance(TaskState::Fetching);
        tracing::debug!("Fetching {}", task.url);
        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            fetched = self.fetcher.fetch_page(&task.url) => Some(fetched),
        };

        let page = match fetched {
            None => {
                task.advance(TaskState::Done);
                self.emit(ExtractionResult::failed(
                    &task.url,
                    FailureKind::Cancelled,
                    "run cancelled during fetch",
                ))
                .await;
                return;
            }
            Some(Err(e)) => {
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                task.advance(TaskState::Done);
                self.emit(ExtractionResult::failed(&task.url, FailureKind::Fetch, e))
                    .await;
                return;
            }
            Some(Ok(page)) => page,
        };

        task.advance(TaskState::Extracting);
        let result = match extract_fetched(task, &page) {
            Ok(extracted) => ExtractionResult::Ok {
                url: task.url.clone(),
                site: Arc::clone(&task.site.spec),
                allowed_path: task
                    .site
                    .policy
                    .matching_allowed_path(&task.parsed)
                    .map(str::to_string),
                title: extracted.title,
                content: extracted.content,
            },
            Err(e) => {
                tracing::warn!("Failed to extract {}: {}", task.url, e);
                let kind = match e {
                    ExtractError::Parse(_) => FailureKind::Parse,
                    ExtractError::NoContent | ExtractError::InvalidSelector { .. } => {
                        FailureKind::Extraction
                    }
                };
                task.advance(TaskState::Done);
                self.emit(ExtractionResult::failed(&task.url, kind, e)).await;
                return;
            }
        };
        self.emit(result).await;

        if task.remaining_depth > 0 {
            task.advance(TaskState::Enqueuing);
            self.enqueue_links(task, &page).await;
        }

        task.advance(TaskState::Done);
    }

    /// Admits the links of a fetched page as children of `task`
    async fn enqueue_links(&self, task: &CrawlTask, page: &FetchedPage) {
        let discovered = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            discovered = self.fetcher.discover_links(page) => discovered,
        };

        let links = match discovered {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Link discovery failed for {}: {}", task.url, e);
                return;
            }
        };

        let depth = task.remaining_depth - 1;
        let mut admitted = 0;
        for link in &links {
            if let Some(child) = admit(&task.site, link, depth) {
                self.queue.push(child);
                admitted += 1;
            }
        }

        tracing::debug!(
            "{}: {} links found, {} admitted",
            task.url,
            links.len(),
            admitted
        );
    }

    async fn emit(&self, result: ExtractionResult) {
        if self.results.send(result).await.is_err() && !self.cancel.is_cancelled() {
            tracing::debug!("Result receiver dropped, stopping workers");
            self.cancel.cancel();
        }
    }
}

/// Decodes, resolves overrides for, and extracts one fetched page
fn extract_fetched(task: &CrawlTask, page: &FetchedPage) -> Result<ExtractedPage, ExtractError> {
    let html = decode_document(&page.body)?;
    let rules = resolve(&task.parsed, &task.site.spec);
    extract_page(html, rules.locator, rules.exclude_selectors)
}
