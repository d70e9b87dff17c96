use crate::core::{CacheHandler, CacheInfo, CacheValue, MetadataRecord, Result};
use async_trait::async_trait;

/// Handler that stores nothing
///
/// Terminal fallback of the factory: writes report success, reads report a
/// miss, and no I/O happens. A handler whose client library was compiled
/// out is represented by an unsupported instance carrying that handler's
/// name.
#[derive(Debug, Clone)]
pub struct NullHandler {
    name: &'static str,
    supported: bool,
}

impl NullHandler {
    pub fn new() -> Self {
        Self {
            name: "null",
            supported: true,
        }
    }

    /// Placeholder for a handler that is not available in this build
    pub fn unavailable(name: &'static str) -> Self {
        Self {
            name,
            supported: false,
        }
    }
}

impl Default for NullHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheHandler for NullHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<CacheValue>> {
        Ok(None)
    }

    async fn save(&self, _key: &str, _value: CacheValue, _ttl_secs: u64) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(true)
    }

    async fn increment(&self, _key: &str, _offset: i64) -> Result<i64> {
        Ok(0)
    }

    async fn decrement(&self, _key: &str, _offset: i64) -> Result<i64> {
        Ok(0)
    }

    async fn clean(&self) -> Result<()> {
        Ok(())
    }

    async fn cache_info(&self) -> Result<CacheInfo> {
        Ok(CacheInfo::Null)
    }

    async fn metadata(&self, _key: &str) -> Result<Option<MetadataRecord>> {
        Ok(None)
    }

    fn is_supported(&self) -> bool {
        self.supported
    }
}
