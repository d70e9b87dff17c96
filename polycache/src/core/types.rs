use serde::{Deserialize, Serialize};

/// Default time-to-live applied by callers that do not pick one, in seconds
pub const DEFAULT_TTL_SECS: u64 = 60;

/// Epoch second at which an item saved at `saved_at` with `ttl_secs` expires
///
/// `None` when the item has no expiry. TTLs too large to represent saturate
/// at `i64::MAX`.
pub fn expiry_timestamp(saved_at: i64, ttl_secs: u64) -> Option<i64> {
    if ttl_secs == 0 {
        return None;
    }
    let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
    Some(saved_at.saturating_add(ttl))
}

/// Backend-defined statistics, passed through without reshaping
pub type CacheInfo = serde_json::Value;

/// A value that can be stored in any cache backend
///
/// The set of shapes is closed: every variant has an explicit encoding in
/// [`EncodedValue`](super::codec::EncodedValue), so a value that reaches a
/// backend always comes back with the same variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects
    Structured(serde_json::Value),
}

impl CacheValue {
    /// Type tag recorded next to the payload
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Null => TypeTag::Null,
            Self::Bool(_) => TypeTag::Boolean,
            Self::Int(_) => TypeTag::Integer,
            Self::Float(_) => TypeTag::Double,
            Self::Text(_) => TypeTag::String,
            Self::Structured(_) => TypeTag::Structured,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for CacheValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for CacheValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for CacheValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for CacheValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for CacheValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<CacheValue>> From<Option<T>> for CacheValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// JSON scalars map onto the scalar variants; only arrays and objects
/// become `Structured`.
impl From<serde_json::Value> for CacheValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::Text(s),
            other => Self::Structured(other),
        }
    }
}

/// Type tag stored alongside an encoded payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Boolean,
    Integer,
    Double,
    String,
    Null,
    Structured,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::String => "string",
            Self::Null => "null",
            Self::Structured => "structured",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "double" => Some(Self::Double),
            "string" => Some(Self::String),
            "null" => Some(Self::Null),
            "structured" => Some(Self::Structured),
            _ => None,
        }
    }

    /// Item flags used by stores that keep a per-item integer next to the
    /// payload
    pub fn flag(&self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::Integer => 2,
            Self::Double => 3,
            Self::String => 4,
            Self::Null => 5,
            Self::Structured => 6,
        }
    }

    pub fn from_flag(flag: u32) -> Option<Self> {
        match flag {
            1 => Some(Self::Boolean),
            2 => Some(Self::Integer),
            3 => Some(Self::Double),
            4 => Some(Self::String),
            5 => Some(Self::Null),
            6 => Some(Self::Structured),
            _ => None,
        }
    }
}

/// Read-only view of an item's expiry and creation time
///
/// Derived on demand from an envelope or from backend introspection; never
/// stored on its own. Fields a backend cannot report stay `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataRecord {
    /// Expiry as epoch seconds, `None` when the item never expires
    pub expire_at: Option<i64>,
    /// When the item was saved, epoch seconds
    pub saved_at: Option<i64>,
    pub data: Option<CacheValue>,
    /// Configured time-to-live in seconds
    pub ttl: Option<u64>,
    /// Seconds since the item was saved
    pub age: Option<u64>,
    pub hit_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expiry_timestamp() {
        assert_eq!(expiry_timestamp(1_000, 0), None);
        assert_eq!(expiry_timestamp(1_000, 60), Some(1_060));
        assert_eq!(expiry_timestamp(1_000, 1 << 63), Some(i64::MAX));
        assert_eq!(expiry_timestamp(1_000, u64::MAX), Some(i64::MAX));
    }

    #[test]
    fn test_tag_roundtrip_through_str_and_flag() {
        for tag in [
            TypeTag::Boolean,
            TypeTag::Integer,
            TypeTag::Double,
            TypeTag::String,
            TypeTag::Null,
            TypeTag::Structured,
        ] {
            assert_eq!(TypeTag::parse(tag.as_str()), Some(tag));
            assert_eq!(TypeTag::from_flag(tag.flag()), Some(tag));
        }
        assert_eq!(TypeTag::parse("resource"), None);
        assert_eq!(TypeTag::from_flag(0), None);
    }

    #[test]
    fn test_from_json_keeps_scalars_scalar() {
        assert_eq!(CacheValue::from(json!(null)), CacheValue::Null);
        assert_eq!(CacheValue::from(json!(7)), CacheValue::Int(7));
        assert_eq!(CacheValue::from(json!(1.5)), CacheValue::Float(1.5));
        assert_eq!(CacheValue::from(json!("a")), CacheValue::Text("a".into()));
        assert_eq!(
            CacheValue::from(json!([1, 2])),
            CacheValue::Structured(json!([1, 2]))
        );
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(CacheValue::from(None::<i64>), CacheValue::Null);
        assert_eq!(CacheValue::from(Some(3i64)), CacheValue::Int(3));
    }
}
