//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → Hand off to the HTTP/1.1 connection task
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - A listener error ends the serve attempt; the lifecycle restarts it

pub mod listener;

pub use listener::{Listener, ListenerError};
