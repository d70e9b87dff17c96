use crate::config::BackendConfig;
use crate::core::{
    CacheError, CacheHandler, CacheInfo, CacheValue, EncodedValue, MetadataRecord, Result,
    TypeTag, expiry_timestamp,
};
use crate::store::{self, LocalStore};
use async_trait::async_trait;
use tracing::info;

/// Process-wide user cache with native per-item metadata
///
/// Every handle in the process talks to the same store, so only the key
/// prefix separates callers. Age, ttl and hit counts come straight from the
/// store.
pub struct SharedHandler {
    config: BackendConfig,
    store: LocalStore,
}

impl SharedHandler {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            config: config.clone(),
            store: store::shared(),
        }
    }

    async fn add(&self, key: &str, delta: i64) -> Result<i64> {
        let key = self.config.prefixed(key);
        self.store
            .incr(&key, delta, TypeTag::Integer.flag())
            .await
    }
}

#[async_trait]
impl CacheHandler for SharedHandler {
    fn name(&self) -> &'static str {
        "shared"
    }

    async fn initialize(&mut self) -> Result<()> {
        info!("Using shared user cache (prefix='{}')", self.config.prefix);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let key = self.config.prefixed(key);
        match self.store.get(&key).await? {
            Some(item) => EncodedValue::from_flagged(&item.data, item.flags)?
                .decode()
                .map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, value: CacheValue, ttl_secs: u64) -> Result<()> {
        let key = self.config.prefixed(key);
        let encoded = EncodedValue::encode(&value)?;
        let flags = encoded.tag.flag();

        self.store
            .set(&key, encoded.payload.into_bytes(), flags, ttl_secs)
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let key = self.config.prefixed(key);
        self.store.delete(&key).await
    }

    async fn increment(&self, key: &str, offset: i64) -> Result<i64> {
        self.add(key, offset).await
    }

    async fn decrement(&self, key: &str, offset: i64) -> Result<i64> {
        let delta = offset
            .checked_neg()
            .ok_or_else(|| CacheError::InvalidValue(format!("offset {offset} out of range")))?;
        self.add(key, delta).await
    }

    async fn clean(&self) -> Result<()> {
        self.store.flush().await
    }

    async fn cache_info(&self) -> Result<CacheInfo> {
        let stats = self.store.stats().await;
        let mut info = serde_json::to_value(&stats)?;
        info["hit_rate"] = stats.hit_rate().into();
        Ok(info)
    }

    async fn metadata(&self, key: &str) -> Result<Option<MetadataRecord>> {
        let key = self.config.prefixed(key);
        let Some(info) = self.store.item_info(&key).await? else {
            return Ok(None);
        };

        let data = EncodedValue::from_flagged(&info.data, info.flags)?.decode()?;

        Ok(Some(MetadataRecord {
            expire_at: expiry_timestamp(info.saved_at, info.ttl_secs),
            saved_at: Some(info.saved_at),
            data: Some(data),
            ttl: Some(info.ttl_secs),
            age: Some(info.age_secs),
            hit_count: Some(info.hit_count),
        }))
    }

    fn is_supported(&self) -> bool {
        self.config.shared.enabled
    }
}
