//! In-process stores
//!
//! Plays the role of a client library for the local adapters: `memory`
//! reaches a store by address, `shared` uses the single process-wide one.

pub mod local_store;
pub mod types;

pub use local_store::{LocalStore, attach, shared};
pub use types::{Item, ItemInfo, StoreConfig, StoreStats, StoredItem};
