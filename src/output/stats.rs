//! Run statistics
//!
//! Counts what happened to every URL of a run and reports it once the bundle
//! has been written.

use crate::output::types::{ExtractionResult, FailureKind};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Per-run outcome counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// URLs that were picked up by a worker
    pub attempted: usize,

    /// URLs whose content was extracted
    pub succeeded: usize,

    /// Failed URLs by failure kind, cancellations excluded
    pub failed: BTreeMap<FailureKind, usize>,

    /// URLs abandoned because the run was cancelled
    pub dropped: usize,

    /// Sections written to the bundle
    pub sections_written: usize,

    /// Files written
    pub files: Vec<PathBuf>,
}

impl RunStats {
    /// Counts the outcomes of a run's results
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        let mut stats = Self {
            attempted: results.len(),
            ..Self::default()
        };

        for result in results {
            match result.failure_kind() {
                None => stats.succeeded += 1,
                Some(kind) if kind.is_cancellation() => stats.dropped += 1,
                Some(kind) => *stats.failed.entry(kind).or_insert(0) += 1,
            }
        }

        stats
    }

    /// Total failures, cancellations excluded
    pub fn failed_total(&self) -> usize {
        self.failed.values().sum()
    }
}

/// Logs the statistics of a finished run
pub fn log_statistics(stats: &RunStats, elapsed: Duration) {
    let success_rate = if stats.attempted > 0 {
        (stats.succeeded as f64 / stats.attempted as f64) * 100.0
    } else {
        0.0
    };

    tracing::info!(
        "Run finished in {:.1?}: {} URLs attempted, {} succeeded ({:.1}%), {} failed, {} dropped",
        elapsed,
        stats.attempted,
        stats.succeeded,
        success_rate,
        stats.failed_total(),
        stats.dropped
    );

    for (kind, count) in &stats.failed {
        tracing::info!("  {} errors: {}", kind, count);
    }

    if !stats.files.is_empty() {
        tracing::info!(
            "Wrote {} sections to {} file(s)",
            stats.sections_written,
            stats.files.len()
        );
    }
}
