//! Cache adapters
//!
//! - `memory`: counter-style in-process store, envelope metadata, raw mode
//! - `shared`: process-wide user cache with native metadata
//! - `redis`: remote key-value server (feature `redis`)
//! - `null`: stores nothing, the last fallback

pub mod memory;
pub mod null;
pub mod shared;

#[cfg(feature = "redis")]
pub mod redis_cache;

pub use memory::MemoryHandler;
pub use null::NullHandler;
pub use shared::SharedHandler;

#[cfg(feature = "redis")]
pub use redis_cache::RedisHandler;
