//! Crawl frontier: per-site dedup ledger and the shared work queue
//!
//! URLs pass admission (normalization, visited check, policy check) before
//! they are queued, so the queue only ever holds work that will be fetched.
//! The queue tracks outstanding work with a counter: a task counts as pending
//! from the moment it is pushed until the worker that took it calls
//! [`WorkQueue::complete`], after having pushed any children. Workers stop
//! once the counter reaches zero.

use crate::config::SiteSpec;
use crate::state::TaskState;
use crate::url::{normalize_url, SitePolicy};
use crate::UrlResult;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Normalized URLs already scheduled for one site
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the URL, returning false if it was already present
    ///
    /// Test and insert happen under one lock, so concurrent callers offering
    /// the same URL see exactly one `true`.
    pub fn try_visit(&self, url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the workers share about one site
#[derive(Debug)]
pub struct SiteCrawl {
    pub spec: Arc<SiteSpec>,
    pub policy: SitePolicy,
    pub visited: VisitedSet,
}

impl SiteCrawl {
    pub fn new(spec: SiteSpec) -> UrlResult<Self> {
        let policy = SitePolicy::new(&spec)?;
        Ok(Self {
            spec: Arc::new(spec),
            policy,
            visited: VisitedSet::new(),
        })
    }
}

/// A URL accepted into the frontier
#[derive(Debug)]
pub struct CrawlTask {
    /// Normalized target URL, the task's identity
    pub url: String,
    /// Parsed form of `url`
    pub parsed: Url,
    pub site: Arc<SiteCrawl>,
    /// Link-following hops still permitted from this page
    pub remaining_depth: u32,
    state: TaskState,
}

impl CrawlTask {
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Moves the task to its next state
    pub fn advance(&mut self, next: TaskState) {
        match self.state.transition(next) {
            Ok(state) => {
                tracing::trace!("{}: {} -> {}", self.url, self.state, state);
                self.state = state;
            }
            Err(e) => tracing::debug!("{}: {}", self.url, e),
        }
    }
}

/// Admits a candidate URL into a site's frontier
///
/// Returns None when the URL is malformed, already visited, or outside the
/// site's host and path policy.
pub fn admit(site: &Arc<SiteCrawl>, candidate: &str, remaining_depth: u32) -> Option<CrawlTask> {
    let normalized = match normalize_url(candidate) {
        Ok(normalized) => normalized,
        Err(e) => {
            tracing::debug!("Skipping {}: {}", candidate, e);
            return None;
        }
    };

    if !site.visited.try_visit(&normalized) {
        tracing::trace!("Already visited: {}", normalized);
        return None;
    }

    let parsed = Url::parse(&normalized).ok()?;

    if !site.policy.allows(&parsed) {
        tracing::debug!("Outside site policy: {}", normalized);
        return None;
    }

    Some(CrawlTask {
        url: normalized,
        parsed,
        site: Arc::clone(site),
        remaining_depth,
        state: TaskState::Seeded,
    })
}

/// Work queue shared by the crawl workers of a run
#[derive(Debug, Default)]
pub struct WorkQueue {
    tasks: Mutex<VecDeque<CrawlTask>>,
    pending: AtomicUsize,
    notify: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task and wakes idle workers
    pub fn push(&self, task: CrawlTask) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
        self.notify.notify_waiters();
    }

    /// Waits for the next task
    ///
    /// Returns None once no work is pending or the run is cancelled.
    pub async fn next(&self, cancel: &CancellationToken) -> Option<CrawlTask> {
        loop {
            // Register before checking, so a push between the check and the
            // wait is not missed
            let notified = self.notify.notified();

            if cancel.is_cancelled() {
                return None;
            }

            if let Some(task) = self.pop() {
                return Some(task);
            }

            if self.pending.load(Ordering::SeqCst) == 0 {
                return None;
            }

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = notified => {}
            }
        }
    }

    /// Marks one task taken from the queue as finished
    pub fn complete(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }

    /// Tasks queued or being processed
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Tasks queued and not yet taken by a worker
    pub fn queued(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn pop(&self) -> Option<CrawlTask> {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}
