//! Error aggregation and the final run summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::errors::ReplaceError;

/// Append-only error list shared by the walker and every worker.
///
/// All appends go through a mutex; this is the only shared mutable state in
/// the pipeline outside the queues themselves.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Arc<Mutex<Vec<ReplaceError>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error without interrupting the run.
    pub fn record(&self, err: ReplaceError) {
        warn!("{}", err);
        self.errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(err);
    }

    pub fn len(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains every collected error, leaving the collector empty.
    pub fn take(&self) -> Vec<ReplaceError> {
        std::mem::take(
            &mut *self
                .errors
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

/// Per-strategy counters updated by the worker pools.
#[derive(Debug, Default)]
pub struct RunStats {
    small_files: AtomicU64,
    large_files: AtomicU64,
}

impl RunStats {
    pub fn record_small(&self) {
        self.small_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_large(&self) {
        self.large_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn small_files(&self) -> u64 {
        self.small_files.load(Ordering::Relaxed)
    }

    pub fn large_files(&self) -> u64 {
        self.large_files.load(Ordering::Relaxed)
    }
}

/// Final report for a run: how many files each strategy attempted, plus
/// every error collected along the way.
#[derive(Debug)]
pub struct ReplaceSummary {
    pub small_files: u64,
    pub large_files: u64,
    pub errors: Vec<ReplaceError>,
}

impl ReplaceSummary {
    pub fn files_processed(&self) -> u64 {
        self.small_files + self.large_files
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
