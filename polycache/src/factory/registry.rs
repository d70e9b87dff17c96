//! Fixed table of known handlers
//!
//! Adding a backend means adding one entry here next to its
//! [`CacheHandler`] implementation.

use crate::config::BackendConfig;
use crate::core::CacheHandler;
use crate::handlers::{MemoryHandler, NullHandler, SharedHandler};

/// Builds an uninitialized handler from a configuration
pub type Constructor = fn(&BackendConfig) -> Box<dyn CacheHandler>;

const REGISTRY: &[(&str, Constructor)] = &[
    ("memory", build_memory),
    ("shared", build_shared),
    ("redis", build_redis),
    ("null", build_null),
    ("dummy", build_null),
];

/// Look up a handler by name, ignoring ASCII case and surrounding spaces
pub fn resolve(name: &str) -> Option<Constructor> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    REGISTRY
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, build)| *build)
}

/// Every registered name
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

fn build_memory(config: &BackendConfig) -> Box<dyn CacheHandler> {
    Box::new(MemoryHandler::new(config))
}

fn build_shared(config: &BackendConfig) -> Box<dyn CacheHandler> {
    Box::new(SharedHandler::new(config))
}

#[cfg(feature = "redis")]
fn build_redis(config: &BackendConfig) -> Box<dyn CacheHandler> {
    Box::new(crate::handlers::RedisHandler::new(config))
}

#[cfg(not(feature = "redis"))]
fn build_redis(_config: &BackendConfig) -> Box<dyn CacheHandler> {
    Box::new(NullHandler::unavailable("redis"))
}

fn build_null(_config: &BackendConfig) -> Box<dyn CacheHandler> {
    Box::new(NullHandler::new())
}
