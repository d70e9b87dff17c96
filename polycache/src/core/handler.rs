use super::error::Result;
use super::types::{CacheInfo, CacheValue, MetadataRecord};
use async_trait::async_trait;

/// Operations every cache adapter implements
///
/// A handler is built from a [`BackendConfig`](crate::config::BackendConfig),
/// probed with [`is_supported`](CacheHandler::is_supported) and then
/// initialized exactly once before any other call. Operation failures are
/// returned as errors and never retried here; retry policy belongs to the
/// caller or to the backend client.
#[async_trait]
pub trait CacheHandler: Send + Sync {
    /// Registry name of this adapter
    fn name(&self) -> &'static str;

    /// Backend-specific setup (dial, attach). Fails with
    /// [`CacheError::BackendUnavailable`](super::CacheError::BackendUnavailable)
    /// when the backend cannot be reached.
    async fn initialize(&mut self) -> Result<()>;

    /// Fetch an item, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<CacheValue>>;

    /// Store an item for `ttl_secs` seconds (`0` keeps it until evicted)
    async fn save(&self, key: &str, value: CacheValue, ttl_secs: u64) -> Result<()>;

    /// Delete an item, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Atomically add `offset` to a raw numeric item
    async fn increment(&self, key: &str, offset: i64) -> Result<i64>;

    /// Atomically subtract `offset` from a raw numeric item. No floor is
    /// applied.
    async fn decrement(&self, key: &str, offset: i64) -> Result<i64>;

    /// Flush the whole physical backend. The key prefix does not limit
    /// what gets removed.
    async fn clean(&self) -> Result<()>;

    /// Backend statistics as reported by the backend
    async fn cache_info(&self) -> Result<CacheInfo>;

    /// Expiry and creation time of an item, `None` when absent or when the
    /// stored data has no readable metadata
    async fn metadata(&self, key: &str) -> Result<Option<MetadataRecord>>;

    /// Whether the client this adapter needs is available. Never performs
    /// I/O.
    fn is_supported(&self) -> bool;

    /// Release backend connections. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
