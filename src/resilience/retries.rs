//! Retry loop driven by a backoff policy.
//!
//! # Design Decisions
//! - An operation is retried until it succeeds, returns a non-retriable
//!   error, or shutdown is signalled; there is no attempt limit
//! - The shutdown signal also cancels an attempt that is still running
//! - The caller sees each failure through the operation's own result

use std::future::Future;
use tokio::sync::broadcast;

use crate::resilience::backoff::SimpleBackoff;

/// Classifies errors for [`retry_with_backoff`].
pub trait Retriable {
    /// Whether the failed operation should be attempted again.
    fn retriable(&self) -> bool {
        true
    }
}

/// Run `op` until it succeeds or fails with a non-retriable error, sleeping
/// `backoff.duration()` between attempts.
///
/// Returns `None` once `shutdown` fires (or its sender is dropped).
pub async fn retry_with_backoff<F, Fut, T, E>(
    backoff: &mut SimpleBackoff,
    shutdown: &mut broadcast::Receiver<()>,
    mut op: F,
) -> Option<Result<T, E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retriable,
{
    loop {
        let result = tokio::select! {
            result = op() => result,
            _ = shutdown.recv() => return None,
        };

        match result {
            Ok(value) => return Some(Ok(value)),
            Err(err) if !err.retriable() => return Some(Err(err)),
            Err(_) => {}
        }

        let delay = backoff.duration();
        tracing::debug!(delay = ?delay, "Backing off before next attempt");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.recv() => return None,
        }
    }
}
