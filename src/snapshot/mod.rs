//! Snapshot providers.
//!
//! # Data Flow
//! ```text
//! Owning process (ipamd datastore, ENI config controller, environment)
//!     → SharedSnapshot::publish / process environment
//!     → SnapshotProvider::snapshot (typed, synchronous, read-only)
//!     → JsonSnapshot::to_json (type-erased, used by the route table)
//! ```
//!
//! # Design Decisions
//! - Providers are injected into the route table, never looked up globally
//! - Readers never block writers: published values sit behind `ArcSwap`
//! - Any `Fn() -> T` where `T: Serialize` is a provider, which keeps test
//!   doubles one line long

pub mod env;
pub mod types;

use std::sync::Arc;
use arc_swap::ArcSwap;
use serde::Serialize;
use thiserror::Error;

pub use env::{EnvSetting, EnvSettings};
pub use types::{AddressInfo, Eni, EniConfigSpec, EniConfigs, EniInventory, PodAddress, PodInventory};

/// Errors produced while rendering a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("snapshot provider panicked")]
    Panicked,
}

/// A synchronous, side-effect-free source of current state.
pub trait SnapshotProvider: Send + Sync {
    type Snapshot: Serialize;

    /// Current state of the owning subsystem.
    fn snapshot(&self) -> Self::Snapshot;
}

impl<F, T> SnapshotProvider for F
where
    F: Fn() -> T + Send + Sync,
    T: Serialize,
{
    type Snapshot = T;

    fn snapshot(&self) -> T {
        self()
    }
}

/// Object-safe view of a provider that renders straight to JSON.
pub trait JsonSnapshot: Send + Sync {
    fn to_json(&self) -> Result<Vec<u8>, SnapshotError>;
}

impl<P: SnapshotProvider> JsonSnapshot for P {
    fn to_json(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec(&self.snapshot())?)
    }
}

/// The five providers behind the standard introspection routes.
#[derive(Clone)]
pub struct Providers {
    pub enis: Arc<dyn JsonSnapshot>,
    pub pods: Arc<dyn JsonSnapshot>,
    pub networkutils_env: Arc<dyn JsonSnapshot>,
    pub ipamd_env: Arc<dyn JsonSnapshot>,
    pub eni_configs: Arc<dyn JsonSnapshot>,
}

/// A value published by its owner and read by the introspection endpoint.
///
/// Clones share the same cell.
pub struct SharedSnapshot<T> {
    inner: Arc<ArcSwap<T>>,
}

impl<T> SharedSnapshot<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    /// Replace the published value.
    pub fn publish(&self, value: T) {
        self.inner.store(Arc::new(value));
    }

    /// Derive a new value from the current one and publish it.
    pub fn update<F>(&self, mut f: F)
    where
        F: FnMut(&T) -> T,
    {
        self.inner.rcu(|current| f(current));
    }

    /// Latest published value.
    pub fn load(&self) -> Arc<T> {
        self.inner.load_full()
    }
}

impl<T> Clone for SharedSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for SharedSnapshot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> SnapshotProvider for SharedSnapshot<T>
where
    T: Serialize + Send + Sync,
{
    type Snapshot = Arc<T>;

    fn snapshot(&self) -> Arc<T> {
        self.load()
    }
}
