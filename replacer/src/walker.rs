//! Recursive directory traversal feeding the two work queues.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::errors::{ReplaceError, ReplaceResult};
use crate::queue::{QueueSender, WorkItem};
use crate::results::ErrorCollector;

/// Walks a directory tree, classifying every regular file by size and
/// routing it to exactly one of the small/large queues.
///
/// Traversal is best-effort: per-entry failures are recorded and siblings
/// continue. Only cancellation aborts the walk. The walker owns the sole
/// senders for both queues, so dropping it closes them exactly once and
/// ends the workers' receive loops.
pub struct Walker {
    threshold: u64,
    small: QueueSender,
    large: QueueSender,
    errors: ErrorCollector,
    token: CancelToken,
}

impl Walker {
    pub fn new(
        threshold: u64,
        small: QueueSender,
        large: QueueSender,
        errors: ErrorCollector,
        token: CancelToken,
    ) -> Self {
        Self {
            threshold,
            small,
            large,
            errors,
            token,
        }
    }

    /// Visits every entry under `root`. The root itself is only recursed
    /// into, never enqueued as a file.
    pub fn run(&self, root: &Path) -> ReplaceResult<()> {
        self.walk_dir(root)
    }

    fn walk_dir(&self, dir: &Path) -> ReplaceResult<()> {
        self.token.check()?;

        let entries = fs::read_dir(dir).map_err(|e| ReplaceError::walk_error(dir, e))?;

        for entry in entries {
            self.token.check()?;

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.errors.record(ReplaceError::walk_error(dir, e));
                    continue;
                }
            };
            let path = entry.path();
            debug!("Walking {}", path.display());

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    self.errors.record(ReplaceError::walk_error(&path, e));
                    continue;
                }
            };

            if file_type.is_dir() {
                match self.walk_dir(&path) {
                    Ok(()) => {}
                    Err(e) if e.is_cancelled() => return Err(e),
                    Err(e) => self.errors.record(e),
                }
            } else if file_type.is_file() {
                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        self.errors.record(ReplaceError::walk_error(&path, e));
                        continue;
                    }
                };

                let item = WorkItem::new(path);
                if metadata.len() > self.threshold {
                    self.large.send(item)?;
                } else {
                    self.small.send(item)?;
                }
            }
            // Symlinks and special files are skipped
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::work_queue;
    use anyhow::Result;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::tempdir;

    fn collect(rx: crate::queue::QueueReceiver) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        while let Some(item) = rx.recv() {
            paths.push(item.path);
        }
        paths.sort();
        paths
    }

    #[test]
    fn test_walk_routes_by_size() -> Result<()> {
        let dir = tempdir()?;
        let sub = dir.path().join("nested/deeper");
        fs::create_dir_all(&sub)?;

        fs::write(dir.path().join("small.txt"), "tiny")?;
        fs::write(sub.join("also_small.txt"), "tin")?;
        let mut big = File::create(sub.join("big.txt"))?;
        big.write_all(&vec![b'x'; 64])?;

        let (small_tx, small_rx) = work_queue(16);
        let (large_tx, large_rx) = work_queue(16);
        let errors = ErrorCollector::new();
        let walker = Walker::new(32, small_tx, large_tx, errors.clone(), CancelToken::new());

        walker.run(dir.path())?;
        drop(walker);

        let small = collect(small_rx);
        let large = collect(large_rx);
        assert_eq!(small.len(), 2);
        assert_eq!(large, vec![sub.join("big.txt")]);
        assert!(errors.is_empty());
        Ok(())
    }

    #[test]
    fn test_walk_threshold_boundary() -> Result<()> {
        // A file exactly at the threshold is still small
        let dir = tempdir()?;
        fs::write(dir.path().join("exact.txt"), "1234")?;

        let (small_tx, small_rx) = work_queue(4);
        let (large_tx, large_rx) = work_queue(4);
        let walker = Walker::new(
            4,
            small_tx,
            large_tx,
            ErrorCollector::new(),
            CancelToken::new(),
        );
        walker.run(dir.path())?;
        drop(walker);

        assert_eq!(collect(small_rx).len(), 1);
        assert!(collect(large_rx).is_empty());
        Ok(())
    }

    #[test]
    fn test_walk_missing_root_fails() {
        let dir = tempdir().unwrap();
        let (small_tx, _small_rx) = work_queue(4);
        let (large_tx, _large_rx) = work_queue(4);
        let walker = Walker::new(
            32,
            small_tx,
            large_tx,
            ErrorCollector::new(),
            CancelToken::new(),
        );

        let err = walker.run(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, ReplaceError::WalkError { .. }));
    }

    #[test]
    fn test_walk_cancelled_before_start() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.txt"), "data")?;

        let (small_tx, small_rx) = work_queue(4);
        let (large_tx, _large_rx) = work_queue(4);
        let token = CancelToken::with_timeout(Duration::ZERO);
        let walker = Walker::new(32, small_tx, large_tx, ErrorCollector::new(), token);

        let err = walker.run(dir.path()).unwrap_err();
        assert!(err.is_cancelled());
        drop(walker);
        assert!(collect(small_rx).is_empty());
        Ok(())
    }

    #[test]
    fn test_walk_empty_tree() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("only/dirs/here"))?;

        let (small_tx, small_rx) = work_queue(4);
        let (large_tx, large_rx) = work_queue(4);
        let walker = Walker::new(
            32,
            small_tx,
            large_tx,
            ErrorCollector::new(),
            CancelToken::new(),
        );
        walker.run(dir.path())?;
        drop(walker);

        assert!(collect(small_rx).is_empty());
        assert!(collect(large_rx).is_empty());
        Ok(())
    }
}
