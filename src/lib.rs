//! Read-only introspection endpoint for the IP address management daemon.
//!
//! Serves JSON snapshots of the ENI inventory, pod address bindings,
//! environment-derived settings and ENIConfigs, plus Prometheus metrics,
//! on a fixed local port. The listener restarts with backoff whenever it
//! stops serving.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod snapshot;

pub use config::schema::IntrospectConfig;
pub use http::{IntrospectionServer, RouteTable};
pub use lifecycle::Shutdown;
pub use snapshot::{Providers, SharedSnapshot, SnapshotProvider};
