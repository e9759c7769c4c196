//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Listener fails:
//!     → retries.rs (classify error, decide whether to try again)
//!     → backoff.rs (compute jittered delay)
//!     → sleep, then the same operation runs again
//! ```
//!
//! # Design Decisions
//! - Tunables come from configuration so tests can use millisecond delays
//! - Jitter is symmetric so restarts of many agents spread out

pub mod backoff;
pub mod retries;

pub use backoff::SimpleBackoff;
pub use retries::{retry_with_backoff, Retriable};
