//! One-shot cooperative cancellation.
//!
//! A [`CancelToken`] combines an interrupt flag (set by a Ctrl-C handler)
//! with an optional deadline derived from the configured timeout. It is
//! polled at natural unit boundaries: before each directory step, before
//! each queue item, and before each line of a streamed rewrite. Once fired
//! it never resets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::{ReplaceError, ReplaceResult};

/// Shared cancellation signal, cheap to clone across threads.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only fires on an explicit [`cancel`](Self::cancel) call.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// A token that additionally fires once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Fires the token. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::SeqCst) {
            return true;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                // Deadline expiry latches into the flag; the token never resets.
                self.flag.store(true, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }

    /// Polls the token, returning `Err(Cancelled)` once it has fired.
    pub fn check(&self) -> ReplaceResult<()> {
        if self.is_cancelled() {
            Err(ReplaceError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// The underlying flag, for wiring up an OS signal handler.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
