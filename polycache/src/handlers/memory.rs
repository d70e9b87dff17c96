use crate::config::BackendConfig;
use crate::core::{
    CacheError, CacheHandler, CacheInfo, CacheValue, EncodedValue, FLAG_ENVELOPE, MetadataRecord,
    Result, StoredEnvelope, TypeTag,
};
use crate::store::{self, Item, LocalStore};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Counter-style store reached by `host:port`
///
/// Values are wrapped in a [`StoredEnvelope`] unless raw mode is on. Raw
/// items keep their type tag in the item flags, which lets the store add to
/// integers in place but leaves no room for a save time, so metadata is only
/// available for enveloped items.
pub struct MemoryHandler {
    config: BackendConfig,
    store: Option<LocalStore>,
}

impl MemoryHandler {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            config: config.clone(),
            store: None,
        }
    }

    fn store(&self) -> Result<&LocalStore> {
        self.store.as_ref().ok_or_else(|| {
            CacheError::ConnectionLost(format!("not attached to {}", self.config.store_addr()))
        })
    }

    fn decode_item(&self, key: &str, item: Item) -> Result<Option<CacheValue>> {
        if item.flags == FLAG_ENVELOPE {
            return match StoredEnvelope::from_bytes(&item.data) {
                Ok(envelope) => envelope.value().decode().map(Some),
                Err(e) => {
                    warn!("Discarding unreadable envelope for key={}: {}", key, e);
                    Ok(None)
                }
            };
        }

        EncodedValue::from_flagged(&item.data, item.flags)?
            .decode()
            .map(Some)
    }

    async fn add(&self, key: &str, delta: i64) -> Result<i64> {
        if !self.config.raw {
            return Err(CacheError::RawModeDisabled);
        }

        let key = self.config.prefixed(key);
        self.store()?
            .incr(&key, delta, TypeTag::Integer.flag())
            .await
    }
}

#[async_trait]
impl CacheHandler for MemoryHandler {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn initialize(&mut self) -> Result<()> {
        if self.store.is_some() {
            return Ok(());
        }

        let address = self.config.store_addr();
        info!(
            "Attaching memory handler to {} (weight={}, raw={})",
            address, self.config.weight, self.config.raw
        );
        self.store = Some(store::attach(&address, self.config.weight));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let key = self.config.prefixed(key);
        match self.store()?.get(&key).await? {
            Some(item) => self.decode_item(&key, item),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, value: CacheValue, ttl_secs: u64) -> Result<()> {
        let key = self.config.prefixed(key);
        let encoded = EncodedValue::encode(&value)?;

        let (data, flags) = if self.config.raw {
            let flags = encoded.tag.flag();
            (encoded.payload.into_bytes(), flags)
        } else {
            let saved_at = chrono::Utc::now().timestamp();
            let envelope = StoredEnvelope::new(encoded, saved_at, ttl_secs);
            (envelope.to_bytes()?, FLAG_ENVELOPE)
        };

        self.store()?.set(&key, data, flags, ttl_secs).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let key = self.config.prefixed(key);
        self.store()?.delete(&key).await
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
        self.store()?.flush().await
    }

    async fn cache_info(&self) -> Result<CacheInfo> {
        let store = self.store()?;
        let stats = store.stats().await;

        let mut info = serde_json::to_value(&stats)?;
        info["hit_rate"] = stats.hit_rate().into();
        info["address"] = store.config().name.clone().into();
        info["weight"] = store.config().weight.into();
        Ok(info)
    }

    async fn metadata(&self, key: &str) -> Result<Option<MetadataRecord>> {
        let key = self.config.prefixed(key);
        let Some(item) = self.store()?.get(&key).await? else {
            return Ok(None);
        };

        if item.flags != FLAG_ENVELOPE {
            debug!("No envelope stored under key={}", key);
            return Ok(None);
        }

        let envelope = match StoredEnvelope::from_bytes(&item.data) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Malformed envelope for key={}: {}", key, e);
                return Ok(None);
            }
        };

        Ok(Some(MetadataRecord {
            expire_at: envelope.expire_at(),
            saved_at: Some(envelope.saved_at()),
            data: Some(envelope.value().decode()?),
            ttl: Some(envelope.ttl()),
            ..Default::default()
        }))
    }

    fn is_supported(&self) -> bool {
        true
    }

    async fn close(&mut self) -> Result<()> {
        if self.store.take().is_some() {
            debug!("Detached from {}", self.config.store_addr());
        }
        Ok(())
    }
}
