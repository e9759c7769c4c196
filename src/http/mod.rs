//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::Listener)
//!     → server.rs (hyper HTTP/1.1, header read deadline)
//!     → middleware/request_log.rs (one log record per request)
//!     → write deadline
//!     → routes.rs (exact path match → snapshot provider → JSON)
//!     → response
//! ```

pub mod middleware;
pub mod routes;
pub mod server;

pub use routes::{RootResponse, RouteError, RouteTable};
pub use server::{FailureCount, IntrospectionServer, ServerError};
