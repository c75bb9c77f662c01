//! The dispatcher: wires the walker to two fixed-size worker pools and
//! aggregates the outcome.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::ReplaceConfig;
use crate::errors::{ReplaceError, ReplaceResult};
use crate::queue::{work_queue, QueueReceiver};
use crate::replace::{replace_in_file, replace_in_large_file};
use crate::results::{ErrorCollector, ReplaceSummary, RunStats};
use crate::walker::Walker;

/// Which rewrite strategy a worker pool runs.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    InMemory,
    Streaming,
}

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Strategy::InMemory => "small",
            Strategy::Streaming => "large",
        }
    }
}

/// Runs a full replace pass over `config.root_path`.
///
/// One walker thread produces into two bounded queues; `thread_count`
/// workers per queue drain them concurrently. Every per-entry and per-file
/// error is collected rather than aborting the run, and the token is polled
/// between units of work. Returns once the walker and all workers have
/// finished.
pub fn run(config: &ReplaceConfig, token: CancelToken) -> ReplaceResult<ReplaceSummary> {
    info!(
        "Starting replace of {:?} with {:?} under {}",
        config.search,
        config.replace,
        config.root_path.display()
    );

    let workers = config.thread_count.get();
    let (small_tx, small_rx) = work_queue(workers);
    let (large_tx, large_rx) = work_queue(workers);
    let errors = ErrorCollector::new();
    let stats = Arc::new(RunStats::default());

    let walker = Walker::new(
        config.large_file_threshold,
        small_tx,
        large_tx,
        errors.clone(),
        token.clone(),
    );
    let root = config.root_path.clone();
    let walker_handle = thread::Builder::new()
        .name("walker".into())
        .spawn(move || walker.run(&root))?;

    let mut handles = Vec::with_capacity(workers * 2);
    for i in 0..workers {
        handles.push(spawn_worker(
            i,
            Strategy::InMemory,
            small_rx.clone(),
            config,
            &errors,
            &stats,
            &token,
        )?);
        handles.push(spawn_worker(
            i,
            Strategy::Streaming,
            large_rx.clone(),
            config,
            &errors,
            &stats,
            &token,
        )?);
    }
    // The engine's receiver clones must not keep the queues alive
    drop(small_rx);
    drop(large_rx);

    match walker_handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => errors.record(e),
        Err(_) => errors.record(ReplaceError::worker_panic("walker")),
    }
    for (name, handle) in handles {
        if handle.join().is_err() {
            errors.record(ReplaceError::worker_panic(name));
        }
    }

    let summary = ReplaceSummary {
        small_files: stats.small_files(),
        large_files: stats.large_files(),
        errors: errors.take(),
    };
    info!(
        "Replace complete: {} files processed, {} errors",
        summary.files_processed(),
        summary.errors.len()
    );
    Ok(summary)
}

fn spawn_worker(
    id: usize,
    strategy: Strategy,
    queue: QueueReceiver,
    config: &ReplaceConfig,
    errors: &ErrorCollector,
    stats: &Arc<RunStats>,
    token: &CancelToken,
) -> ReplaceResult<(String, JoinHandle<()>)> {
    let name = format!("{}-worker-{}", strategy.name(), id);
    let search = config.search.clone();
    let replace = config.replace.clone();
    let errors = errors.clone();
    let stats = Arc::clone(stats);
    let token = token.clone();

    let handle = thread::Builder::new().name(name.clone()).spawn(move || {
        while let Some(item) = queue.recv() {
            if token.is_cancelled() {
                errors.record(ReplaceError::Cancelled);
                return;
            }

            debug!("Processing {}", item.path.display());
            let outcome = match strategy {
                Strategy::InMemory => {
                    stats.record_small();
                    replace_in_file(&item.path, &search, &replace)
                }
                Strategy::Streaming => {
                    stats.record_large();
                    replace_in_large_file(&item.path, &search, &replace, &token)
                }
            };
            if let Err(e) = outcome {
                errors.record(e);
            }
        }
    })?;

    Ok((name, handle))
}
