//! Cooperative cancellation.

use std::sync::Arc;

use portable_atomic::{AtomicBool, Ordering};

/// The operation observed a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("operation cancelled")]
pub struct Cancelled;

/// A shared cancellation flag.
///
/// Clones observe the same flag. Long-running operations call
/// [`Cancellation::check`] between passes, branches and guesses, never in the
/// middle of a clue evaluation.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// Creates a flag that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Returns `Err(Cancelled)` if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] once the flag is set.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
