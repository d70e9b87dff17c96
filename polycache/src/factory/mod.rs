pub mod registry;
pub mod selector;

pub use selector::{CacheFactory, DEFAULT_HANDLER, select};
