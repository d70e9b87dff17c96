use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Item held by the local store, with the metadata the store tracks natively
#[derive(Debug, Clone)]
pub struct StoredItem {
    /// Raw byte data
    pub data: Vec<u8>,
    /// Opaque per-item flags chosen by the writer
    pub flags: u32,
    /// Configured time-to-live, `0` for none
    pub ttl_secs: u64,
    /// Optional expiration time
    pub expires_at: Option<Instant>,
    /// When the value was written
    pub created_at: Instant,
    /// Wall clock time of the write, epoch seconds
    pub saved_at: i64,
    /// Number of successful reads
    pub hits: u64,
}

impl StoredItem {
    /// Create a new stored item
    ///
    /// A TTL beyond what the monotonic clock can represent never expires.
    pub fn new(data: Vec<u8>, flags: u32, ttl_secs: u64) -> Self {
        let now = Instant::now();
        let expires_at = match ttl_secs {
            0 => None,
            secs => now.checked_add(Duration::from_secs(secs)),
        };
        Self {
            data,
            flags,
            ttl_secs,
            expires_at,
            created_at: now,
            saved_at: chrono::Utc::now().timestamp(),
            hits: 0,
        }
    }

    /// Check if the item has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires| Instant::now() >= expires)
    }

    /// Seconds since the item was written
    pub fn age_secs(&self) -> u64 {
        self.created_at.elapsed().as_secs()
    }
}

/// Item as handed back to readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub data: Vec<u8>,
    pub flags: u32,
}

/// Introspection record for a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub data: Vec<u8>,
    pub flags: u32,
    pub age_secs: u64,
    pub ttl_secs: u64,
    pub saved_at: i64,
    pub hit_count: u64,
}

/// Configuration for a local store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name the store is registered under
    pub name: String,
    /// Maximum memory in MB
    pub max_memory_mb: usize,
    /// Relative weight announced by the clients that attached to it
    pub weight: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "local".to_string(),
            max_memory_mb: 512,
            weight: 1,
        }
    }
}

/// Statistics for a local store
#[derive(Debug, Default, Clone, Serialize)]
pub struct StoreStats {
    /// Total number of keys
    pub total_keys: usize,
    /// Estimated memory usage in bytes
    pub total_memory_bytes: usize,
    /// Number of GET operations
    pub gets: u64,
    /// Number of SET operations
    pub sets: u64,
    /// Number of DELETE operations
    pub dels: u64,
    /// Number of INCR/DECR operations
    pub incrs: u64,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of FLUSH operations
    pub flushes: u64,
}

impl StoreStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_without_ttl_never_expires() {
        let item = StoredItem::new(b"v".to_vec(), 0, 0);
        assert!(item.expires_at.is_none());
        assert!(!item.is_expired());
    }

    #[test]
    fn test_item_with_ttl() {
        let item = StoredItem::new(b"v".to_vec(), 0, 60);
        assert!(!item.is_expired());
        let expires = item.expires_at.unwrap();
        assert_eq!(expires - item.created_at, Duration::from_secs(60));
    }

    #[test]
    fn test_item_with_unrepresentable_ttl() {
        for ttl in [1 << 63, u64::MAX] {
            let item = StoredItem::new(b"v".to_vec(), 0, ttl);
            assert_eq!(item.ttl_secs, ttl);
            assert!(!item.is_expired());
        }
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = StoreStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        stats.hits = 3;
        stats.misses = 1;
        assert_eq!(stats.hit_rate(), 0.75);
    }
}
