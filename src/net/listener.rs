//! TCP listener with a connection limit.
//!
//! # Responsibilities
//! - Bind the introspection address
//! - Accept incoming TCP connections
//! - Enforce max_connections via semaphore
//! - Skip per-connection accept errors, surface listener-level ones

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::resilience::Retriable;

/// Error type for listener operations. Ends the current serve attempt.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// Every listener failure is worth another attempt: a port held by a stale
/// instance is released once that instance exits.
impl Retriable for ListenerError {}

/// A bounded TCP listener.
///
/// When `max_connections` connections are open, accepting waits until one
/// of them closes.
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
}

impl Listener {
    pub async fn bind(addr: SocketAddr, max_connections: usize) -> Result<Self, ListenerError> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;

        tracing::info!(
            address = %inner.local_addr().unwrap_or(addr),
            max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner,
            connection_limit: Arc::new(Semaphore::new(max_connections)),
        })
    }

    /// Accept a new connection, respecting the connection limit.
    ///
    /// The returned permit must be held for the connection's lifetime.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, OwnedSemaphorePermit), ListenerError> {
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .map_err(|err| ListenerError::Accept(std::io::Error::other(err)))?;

        loop {
            match self.inner.accept().await {
                Ok((stream, addr)) => {
                    tracing::debug!(
                        peer_addr = %addr,
                        available_permits = self.connection_limit.available_permits(),
                        "Connection accepted"
                    );
                    return Ok((stream, addr, permit));
                }
                Err(err) if is_connection_error(&err) => {
                    tracing::debug!(error = %err, "Connection dropped before accept");
                }
                Err(err) => return Err(ListenerError::Accept(err)),
            }
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Currently free connection slots.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }
}

/// Errors that concern a single peer rather than the listening socket.
fn is_connection_error(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionRefused | ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn second_bind_on_same_port_fails() {
        let first = Listener::bind("127.0.0.1:0".parse().unwrap(), 4).await.unwrap();
        let addr = first.local_addr().unwrap();

        let err = Listener::bind(addr, 4).await.err().expect("port should be taken");
        assert!(matches!(err, ListenerError::Bind { .. }));
        assert!(err.retriable());
    }

    #[tokio::test]
    async fn permits_are_released_on_drop() {
        let listener = Listener::bind("127.0.0.1:0".parse().unwrap(), 1).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _client = TcpStream::connect(addr).await.unwrap();
        let (_stream, _, permit) = listener.accept().await.unwrap();
        assert_eq!(listener.available_permits(), 0);

        drop(permit);
        assert_eq!(listener.available_permits(), 1);
    }

    #[tokio::test]
    async fn full_limiter_waits_instead_of_failing() {
        let listener = Listener::bind("127.0.0.1:0".parse().unwrap(), 1).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _first = TcpStream::connect(addr).await.unwrap();
        let (_stream, _, permit) = listener.accept().await.unwrap();

        let _second = TcpStream::connect(addr).await.unwrap();
        let blocked = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
        assert!(blocked.is_err(), "accept should wait for a free slot");

        drop(permit);
        let accepted = tokio::time::timeout(Duration::from_secs(1), listener.accept()).await;
        assert!(matches!(accepted, Ok(Ok(_))));
    }
}
