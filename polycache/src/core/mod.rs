pub mod codec;
pub mod error;
pub mod handler;
pub mod types;

pub use codec::{EncodedValue, FLAG_ENVELOPE, StoredEnvelope};
pub use error::{CacheError, Result};
pub use handler::CacheHandler;
pub use types::{
    CacheInfo, CacheValue, DEFAULT_TTL_SECS, MetadataRecord, TypeTag, expiry_timestamp,
};
