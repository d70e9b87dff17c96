use super::types::{Item, ItemInfo, StoreConfig, StoreStats, StoredItem};
use crate::core::error::{CacheError, Result};
use lazy_static::lazy_static;
use parking_lot::{Mutex, RwLock};
use radix_trie::{Trie, TrieCommon};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

lazy_static! {
    /// Stores reachable by address, one per `host:port`
    static ref ADDRESSED: Mutex<HashMap<String, LocalStore>> = Mutex::new(HashMap::new());

    /// The single process-wide user cache
    static ref SHARED: LocalStore = LocalStore::new(StoreConfig {
        name: "shared".to_string(),
        ..Default::default()
    });
}

/// Attach to the store listening on `address`, creating it on first use
pub fn attach(address: &str, weight: u32) -> LocalStore {
    let mut stores = ADDRESSED.lock();
    stores
        .entry(address.to_string())
        .or_insert_with(|| {
            LocalStore::new(StoreConfig {
                name: address.to_string(),
                weight,
                ..Default::default()
            })
        })
        .clone()
}

/// Handle to the process-wide user cache
pub fn shared() -> LocalStore {
    SHARED.clone()
}

/// In-process key-value store backing the local adapters
///
/// Keys live in a radix trie; every item carries flags, a write timestamp
/// and a hit counter so adapters can report metadata without an envelope.
/// Expired items are dropped lazily on access, and all at once when a write
/// would otherwise exceed the memory limit.
#[derive(Clone)]
pub struct LocalStore {
    data: Arc<RwLock<Trie<String, StoredItem>>>,
    stats: Arc<RwLock<StoreStats>>,
    config: Arc<StoreConfig>,
}

impl LocalStore {
    /// Create a new store with the given configuration
    pub fn new(config: StoreConfig) -> Self {
        info!(
            "Initializing local store '{}' with max_memory={}MB",
            config.name, config.max_memory_mb
        );

        Self {
            data: Arc::new(RwLock::new(Trie::new())),
            stats: Arc::new(RwLock::new(StoreStats::default())),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Set a key, replacing any previous item
    pub async fn set(&self, key: &str, value: Vec<u8>, flags: u32, ttl_secs: u64) -> Result<()> {
        debug!(
            "SET key={}, size={}, flags={}, ttl={}",
            key,
            value.len(),
            flags,
            ttl_secs
        );

        let item = StoredItem::new(value, flags, ttl_secs);
        let entry_size = Self::estimate_entry_size(key, &item);

        let mut data = self.data.write();
        let mut stats = self.stats.write();
        let max_bytes = self.config.max_memory_mb * 1024 * 1024;

        let mut previous_size = Self::stored_size(&data, key);
        if stats.total_memory_bytes.saturating_sub(previous_size) + entry_size > max_bytes {
            // Expired items still count until removed; reclaim them once
            let purged = Self::remove_expired(&mut data, &mut stats);
            previous_size = Self::stored_size(&data, key);

            if purged == 0
                || stats.total_memory_bytes.saturating_sub(previous_size) + entry_size > max_bytes
            {
                warn!(
                    "Memory limit exceeded: {}/{}",
                    stats.total_memory_bytes, max_bytes
                );
                return Err(CacheError::MemoryLimitExceeded);
            }
        }

        let is_new = data.insert(key.to_string(), item).is_none();

        stats.sets += 1;
        if is_new {
            stats.total_keys += 1;
        }
        stats.total_memory_bytes =
            stats.total_memory_bytes.saturating_sub(previous_size) + entry_size;

        Ok(())
    }

    /// Get an item by key
    pub async fn get(&self, key: &str) -> Result<Option<Item>> {
        debug!("GET key={}", key);

        let mut data = self.data.write();
        let mut stats = self.stats.write();
        stats.gets += 1;

        let expired = match data.get_mut(key) {
            Some(item) if !item.is_expired() => {
                item.hits += 1;
                stats.hits += 1;
                return Ok(Some(Item {
                    data: item.data.clone(),
                    flags: item.flags,
                }));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!("Key expired: {}", key);
            if let Some(old) = data.remove(key) {
                stats.total_keys = stats.total_keys.saturating_sub(1);
                stats.total_memory_bytes = stats
                    .total_memory_bytes
                    .saturating_sub(Self::estimate_entry_size(key, &old));
            }
        }
        stats.misses += 1;
        Ok(None)
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<bool> {
        debug!("DELETE key={}", key);

        let mut data = self.data.write();
        match data.remove(key) {
            Some(old) => {
                let mut stats = self.stats.write();
                stats.dels += 1;
                stats.total_keys = stats.total_keys.saturating_sub(1);
                stats.total_memory_bytes = stats
                    .total_memory_bytes
                    .saturating_sub(Self::estimate_entry_size(key, &old));
                Ok(!old.is_expired())
            }
            None => Ok(false),
        }
    }

    /// Atomic add on an item holding a decimal integer
    ///
    /// The item keeps its expiry; `flags` replaces the previous flags. The
    /// key must exist and no floor is applied to the result.
    pub async fn incr(&self, key: &str, delta: i64, flags: u32) -> Result<i64> {
        debug!("INCR key={}, delta={}", key, delta);

        let mut data = self.data.write();
        let item = data
            .get_mut(key)
            .filter(|item| !item.is_expired())
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))?;

        let current = std::str::from_utf8(&item.data)
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or_else(|| CacheError::InvalidValue("Value is not a valid integer".to_string()))?;

        let new_value = current
            .checked_add(delta)
            .ok_or_else(|| CacheError::InvalidValue("Integer overflow".to_string()))?;
        let new_data = new_value.to_string().into_bytes();

        let mut stats = self.stats.write();
        stats.incrs += 1;
        stats.total_memory_bytes =
            stats.total_memory_bytes.saturating_sub(item.data.len()) + new_data.len();

        item.data = new_data;
        item.flags = flags;

        Ok(new_value)
    }

    /// Remove every item
    pub async fn flush(&self) -> Result<()> {
        let mut data = self.data.write();
        let mut stats = self.stats.write();
        let count = stats.total_keys;

        *data = Trie::new();
        stats.total_keys = 0;
        stats.total_memory_bytes = 0;
        stats.flushes += 1;

        info!("Flushed local store '{}' ({} keys)", self.config.name, count);
        Ok(())
    }

    /// Native metadata for one item
    pub async fn item_info(&self, key: &str) -> Result<Option<ItemInfo>> {
        let data = self.data.read();
        Ok(data
            .get(key)
            .filter(|item| !item.is_expired())
            .map(|item| ItemInfo {
                data: item.data.clone(),
                flags: item.flags,
                age_secs: item.age_secs(),
                ttl_secs: item.ttl_secs,
                saved_at: item.saved_at,
                hit_count: item.hits,
            }))
    }

    /// Get statistics
    pub async fn stats(&self) -> StoreStats {
        self.stats.read().clone()
    }

    /// Drop every expired item, returning how many were removed
    fn remove_expired(data: &mut Trie<String, StoredItem>, stats: &mut StoreStats) -> usize {
        let expired: Vec<(String, usize)> = data
            .iter()
            .filter(|(_, item)| item.is_expired())
            .map(|(k, item)| (k.clone(), Self::estimate_entry_size(k, item)))
            .collect();

        let count = expired.len();
        if count > 0 {
            debug!("Cleaning up {} expired keys", count);
            for (key, size) in expired {
                data.remove(&key);
                stats.total_memory_bytes = stats.total_memory_bytes.saturating_sub(size);
            }
            stats.total_keys = stats.total_keys.saturating_sub(count);
        }

        count
    }

    fn stored_size(data: &Trie<String, StoredItem>, key: &str) -> usize {
        data.get(key)
            .map(|item| Self::estimate_entry_size(key, item))
            .unwrap_or(0)
    }

    /// Estimate memory size of an entry
    fn estimate_entry_size(key: &str, item: &StoredItem) -> usize {
        key.len() + item.data.len() + std::mem::size_of::<StoredItem>()
    }
}
