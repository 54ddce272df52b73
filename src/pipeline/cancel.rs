//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Requests cancellation of a session.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Observes a cancellation request. Checked by the orchestrator between
/// segment invocations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Returns a token that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self::default()
    }

    /// Returns true if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Creates a connected cancellation handle and token.
///
/// # Examples
///
/// ```
/// use chunkstream::pipeline::cancellation;
///
/// let (handle, token) = cancellation();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[must_use]
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let flag = Arc::new(AtomicBool::new(false));
    (
        CancelHandle {
            flag: Arc::clone(&flag),
        },
        CancelToken { flag },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_cancelled() {
        assert!(!CancelToken::never().is_cancelled());
        assert!(!CancelToken::default().is_cancelled());
    }

    #[test]
    fn test_cancel_is_shared() {
        let (handle, token) = cancellation();
        let other = token.clone();
        handle.clone().cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(token.is_cancelled());
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_unrelated_tokens_are_independent() {
        let (handle, _token) = cancellation();
        let (_, other) = cancellation();
        handle.cancel();
        assert!(!other.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_from_another_task() {
        let (handle, token) = cancellation();
        tokio::spawn(async move { handle.cancel() }).await.unwrap();
        assert!(token.is_cancelled());
    }
}
