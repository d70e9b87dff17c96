//! Value codec
//!
//! Turns a [`CacheValue`] into a `(tag, payload)` pair that any backend can
//! hold as plain text, and wraps it into a [`StoredEnvelope`] for backends
//! that have no per-key metadata of their own.

use super::error::{CacheError, Result};
use super::types::{CacheValue, TypeTag, expiry_timestamp};
use serde::{Deserialize, Serialize};

/// Item flag marking an item whose payload is a [`StoredEnvelope`]
pub const FLAG_ENVELOPE: u32 = 0x100;

/// A value reduced to its type tag and textual payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedValue {
    pub tag: TypeTag,
    pub payload: String,
}

impl EncodedValue {
    pub fn new(tag: TypeTag, payload: impl Into<String>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// Encode a value. Scalars pass through as text, arrays and objects are
    /// serialized as JSON.
    pub fn encode(value: &CacheValue) -> Result<Self> {
        let payload = match value {
            CacheValue::Null => String::new(),
            CacheValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            CacheValue::Int(i) => i.to_string(),
            CacheValue::Float(f) => {
                if !f.is_finite() {
                    return Err(CacheError::UnencodableValue(format!(
                        "non-finite float {f}"
                    )));
                }
                f.to_string()
            }
            CacheValue::Text(s) => s.clone(),
            CacheValue::Structured(v) => serde_json::to_string(v)
                .map_err(|e| CacheError::UnencodableValue(e.to_string()))?,
        };

        Ok(Self::new(value.tag(), payload))
    }

    /// Reverse [`EncodedValue::encode`], restoring the original variant
    pub fn decode(&self) -> Result<CacheValue> {
        let bad = || {
            CacheError::Serialization(format!(
                "payload {:?} is not a valid {}",
                self.payload,
                self.tag.as_str()
            ))
        };

        match self.tag {
            TypeTag::Null => Ok(CacheValue::Null),
            TypeTag::Boolean => match self.payload.as_str() {
                "1" | "true" => Ok(CacheValue::Bool(true)),
                "0" | "" | "false" => Ok(CacheValue::Bool(false)),
                _ => Err(bad()),
            },
            TypeTag::Integer => self
                .payload
                .trim()
                .parse::<i64>()
                .map(CacheValue::Int)
                .map_err(|_| bad()),
            TypeTag::Double => self
                .payload
                .trim()
                .parse::<f64>()
                .map(CacheValue::Float)
                .map_err(|_| bad()),
            TypeTag::String => Ok(CacheValue::Text(self.payload.clone())),
            TypeTag::Structured => Ok(CacheValue::Structured(serde_json::from_str(
                &self.payload,
            )?)),
        }
    }

    /// Decode from raw bytes plus the item flag a store kept for them
    pub fn from_flagged(data: &[u8], flags: u32) -> Result<Self> {
        let tag = TypeTag::from_flag(flags)
            .ok_or_else(|| CacheError::Serialization(format!("unknown item flag {flags}")))?;
        let payload = std::str::from_utf8(data)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        Ok(Self::new(tag, payload))
    }
}

/// `(value, saved_at, ttl)` triple stored by envelope-based adapters
///
/// Serialized as a three element JSON array. Anything else found under a key
/// is rejected with [`CacheError::MalformedMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEnvelope(pub EncodedValue, pub i64, pub u64);

impl StoredEnvelope {
    pub fn new(value: EncodedValue, saved_at: i64, ttl_secs: u64) -> Self {
        Self(value, saved_at, ttl_secs)
    }

    pub fn value(&self) -> &EncodedValue {
        &self.0
    }

    pub fn saved_at(&self) -> i64 {
        self.1
    }

    pub fn ttl(&self) -> u64 {
        self.2
    }

    /// `saved_at + ttl`, or `None` for items saved without expiry
    pub fn expire_at(&self) -> Option<i64> {
        expiry_timestamp(self.1, self.2)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::MalformedMetadata(e.to_string()))
    }
}
