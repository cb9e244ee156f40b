//! Key-value storage abstraction.
//!
//! The [`KvStore`] trait is the only way the intake service reaches
//! persistent state. Keys are artifact ids; values are JSON-serialized
//! [`ArtifactRecord`](crate::models::ArtifactRecord)s. The trait carries no
//! schema: it stores and returns opaque strings.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//! Each `put` replaces the whole value for its key atomically; nothing
//! else is coordinated.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Abstract key-value backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`put`](KvStore::put) | Write a value, replacing any existing one |
/// | [`get`](KvStore::get) | Read a value by key |
/// | [`list`](KvStore::list) | Enumerate keys in ascending order, up to a limit |
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Store `value` under `key`, unconditionally overwriting.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Fetch the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Return at most `limit` keys, in ascending key order.
    async fn list(&self, limit: usize) -> Result<Vec<String>>;
}
