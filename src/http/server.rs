//! Introspection server and its restart loop.
//!
//! # Responsibilities
//! - Compose route table, request logger and write deadline once
//! - Serve HTTP/1.1 connections with a header read deadline
//! - Restart the listener with jittered backoff whenever serving stops
//!
//! # State Machine
//! ```text
//! Starting → Serving: build the instance (once)
//! Serving → Backing-off: serve() returned an error; report it once
//! Backing-off → Serving: backoff delay elapsed; serve() again, same instance
//! any → Stopped: shutdown broadcast
//! ```

use std::convert::Infallible;
use std::net::{AddrParseError, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use axum::{extract::ConnectInfo, http::StatusCode, middleware, Router};
use hyper::{body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::rt::{TokioIo, TokioTimer};
use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_http::timeout::TimeoutLayer;

use crate::config::{BackoffConfig, IntrospectConfig};
use crate::http::middleware::log_request;
use crate::http::routes::{RouteError, RouteTable};
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::resilience::{retry_with_backoff, SimpleBackoff};

/// Errors building the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid bind address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error(transparent)]
    Routes(#[from] RouteError),
}

/// Number of times the server stopped serving, shared with observers.
#[derive(Debug, Clone, Default)]
pub struct FailureCount(Arc<AtomicU64>);

impl FailureCount {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// The introspection endpoint.
pub struct IntrospectionServer {
    addr: SocketAddr,
    app: Router,
    read_timeout: Duration,
    max_connections: usize,
    backoff: BackoffConfig,
    failures: FailureCount,
}

impl IntrospectionServer {
    /// Build the server instance reused by every serve attempt.
    pub fn new(
        config: &IntrospectConfig,
        routes: RouteTable,
        metrics_handle: PrometheusHandle,
    ) -> Result<Self, ServerError> {
        let server = &config.server;
        let addr = server
            .bind_address
            .parse()
            .map_err(|source| ServerError::Address {
                address: server.bind_address.clone(),
                source,
            })?;

        let write_timeout = Duration::from_secs(server.write_timeout_secs);
        let app = Self::build_router(routes, metrics_handle, write_timeout)?;

        Ok(Self {
            addr,
            app,
            read_timeout: Duration::from_secs(server.read_timeout_secs),
            max_connections: server.max_connections,
            backoff: config.backoff.clone(),
            failures: FailureCount::default(),
        })
    }

    /// Route table wrapped in the write deadline, then the request logger.
    fn build_router(
        routes: RouteTable,
        metrics_handle: PrometheusHandle,
        write_timeout: Duration,
    ) -> Result<Router, RouteError> {
        Ok(routes
            .into_router(metrics_handle)?
            .layer(write_deadline(write_timeout))
            .layer(middleware::from_fn(log_request)))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle on the number of failed serve attempts so far.
    pub fn failures(&self) -> FailureCount {
        self.failures.clone()
    }

    /// One listen-and-serve attempt. Only returns on failure.
    pub async fn serve(&self) -> Result<Infallible, ListenerError> {
        let listener = Listener::bind(self.addr, self.max_connections).await?;

        loop {
            let (stream, remote, permit) = listener.accept().await?;
            let app = self.app.clone();
            let read_timeout = self.read_timeout;

            tokio::spawn(async move {
                let _permit = permit;
                let service = service_fn(move |mut request: axum::http::Request<Incoming>| {
                    request.extensions_mut().insert(ConnectInfo(remote));
                    app.clone().oneshot(request)
                });

                let mut builder = http1::Builder::new();
                builder.timer(TokioTimer::new()).header_read_timeout(read_timeout);
                if let Err(err) = builder.serve_connection(TokioIo::new(stream), service).await {
                    tracing::debug!(peer_addr = %remote, error = %err, "Connection ended with error");
                }
            });
        }
    }

    /// Serve, restarting after every failure until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut backoff = SimpleBackoff::from(&self.backoff);
        tracing::info!(address = %self.addr, "Introspection server starting");

        match retry_with_backoff(&mut backoff, &mut shutdown, || self.attempt()).await {
            None => tracing::info!("Introspection server stopped"),
            Some(Err(err)) => tracing::error!(error = %err, "Introspection server gave up"),
            Some(Ok(never)) => match never {},
        }
    }

    /// Run the restart loop on its own task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn attempt(&self) -> Result<Infallible, ListenerError> {
        let report = Once::new();
        let result = self.serve().await;
        if let Err(err) = &result {
            report.call_once(|| {
                tracing::error!(address = %self.addr, error = %err, "Error running http api");
                self.failures.increment();
                metrics::record_serve_failure();
            });
        }
        result
    }
}

/// Answers 408 once `timeout` passes. Only fires at an await point, so a
/// provider that blocks while building its snapshot runs to completion.
fn write_deadline(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
