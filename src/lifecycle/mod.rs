//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging/metrics → Build route table → Spawn server
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → server retry loop returns → process exits
//! ```
//!
//! # Design Decisions
//! - In-flight connections are not drained; the endpoint is read-only

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
