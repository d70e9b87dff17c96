//! # polycache
//!
//! One cache contract, several backends. A [`CacheFactory`] turns a
//! [`BackendConfig`] and a handler name into a ready [`CacheHandler`],
//! falling back to a backup handler and finally to a no-op handler when the
//! requested backend is not available.
//!
//! ```rust,no_run
//! use polycache::{BackendConfig, CacheValue, select};
//!
//! # async fn example() -> polycache::Result<()> {
//! let config = BackendConfig::default().with_prefix("app_");
//! let cache = select(&config, Some("memory"), Some("null")).await?;
//!
//! cache.save("visits", CacheValue::Int(42), 60).await?;
//! let visits = cache.get("visits").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod factory;
pub mod handlers;
pub mod store;

// Re-export commonly used types
pub use config::{BackendConfig, RedisOptions, SharedOptions};
pub use crate::core::{
    CacheError, CacheHandler, CacheInfo, CacheValue, DEFAULT_TTL_SECS, EncodedValue,
    MetadataRecord, Result, StoredEnvelope, TypeTag,
};
pub use factory::{CacheFactory, DEFAULT_HANDLER, select};
pub use handlers::{MemoryHandler, NullHandler, SharedHandler};

#[cfg(feature = "redis")]
pub use handlers::RedisHandler;
