use crate::config::{BackendConfig, RedisOptions};
use crate::core::{
    CacheError, CacheHandler, CacheInfo, CacheValue, EncodedValue, MetadataRecord, Result,
    TypeTag, expiry_timestamp,
};
use async_trait::async_trait;
use lazy_static::lazy_static;
use redis::aio::MultiplexedConnection;
use redis::{Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, Script};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const TYPE_FIELD: &str = "__ci_type";
const VALUE_FIELD: &str = "__ci_value";

/// Largest absolute expiry the server accepts, in epoch seconds
const REDIS_MAX_EXPIRE_AT: i64 = i64::MAX / 1000;

lazy_static! {
    /// HINCRBY only when the item exists, so a missing key is reported
    /// instead of being created as a bare counter
    static ref ADD_SCRIPT: Script = Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 0 then
            return nil
        end
        local value = redis.call('HINCRBY', KEYS[1], ARGV[1], ARGV[3])
        redis.call('HSET', KEYS[1], ARGV[2], 'integer')
        return value
        "
    );
}

/// Remote key-value adapter
///
/// Each item is a hash holding the type tag and the payload; expiry is the
/// server's own key TTL.
pub struct RedisHandler {
    prefix: String,
    options: RedisOptions,
    connection: Option<MultiplexedConnection>,
}

impl RedisHandler {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            options: config.redis.clone(),
            connection: None,
        }
    }

    fn connection_info(&self) -> Result<ConnectionInfo> {
        match self.options.scheme.as_str() {
            "tcp" | "redis" => Ok(ConnectionInfo {
                addr: ConnectionAddr::Tcp(self.options.host.clone(), self.options.port),
                redis: RedisConnectionInfo {
                    db: self.options.database,
                    password: self.options.password.clone(),
                    ..Default::default()
                },
            }),
            other => Err(CacheError::Config(format!(
                "unsupported redis scheme '{other}'"
            ))),
        }
    }

    fn connection(&self) -> Result<MultiplexedConnection> {
        self.connection.clone().ok_or_else(|| {
            CacheError::ConnectionLost(format!(
                "not connected to {}:{}",
                self.options.host, self.options.port
            ))
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    async fn read(&self, key: &str) -> Result<Option<CacheValue>> {
        let mut conn = self.connection()?;
        let fields: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(key)
            .arg(TYPE_FIELD)
            .arg(VALUE_FIELD)
            .query_async(&mut conn)
            .await?;

        let (Some(tag), Some(payload)) = (
            fields.first().cloned().flatten(),
            fields.get(1).cloned().flatten(),
        ) else {
            return Ok(None);
        };

        let Some(tag) = TypeTag::parse(&tag) else {
            warn!("Unknown type tag '{}' under key={}", tag, key);
            return Ok(None);
        };

        EncodedValue::new(tag, payload).decode().map(Some)
    }

    async fn add(&self, key: &str, delta: i64) -> Result<i64> {
        let key = self.key(key);
        debug!("HINCRBY key={}, delta={}", key, delta);

        let mut conn = self.connection()?;
        let value: Option<i64> = ADD_SCRIPT
            .key(&key)
            .arg(VALUE_FIELD)
            .arg(TYPE_FIELD)
            .arg(delta)
            .invoke_async(&mut conn)
            .await?;

        value.ok_or(CacheError::KeyNotFound(key))
    }
}

#[async_trait]
impl CacheHandler for RedisHandler {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn initialize(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }

        let unavailable = |e: String| {
            CacheError::BackendUnavailable(format!(
                "redis connection refused ({}:{}): {}",
                self.options.host, self.options.port, e
            ))
        };

        let client = Client::open(self.connection_info()?).map_err(|e| unavailable(e.to_string()))?;
        let connect = client.get_multiplexed_async_connection();
        let mut conn = match self.options.connect_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| unavailable("connection timed out".to_string()))?,
            None => connect.await,
        }
        .map_err(|e| unavailable(e.to_string()))?;

        // Check the connection is valid by asking for the server time
        let _: Vec<String> = redis::cmd("TIME")
            .query_async(&mut conn)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        info!(
            "Connected to redis at {}:{} (db={})",
            self.options.host, self.options.port, self.options.database
        );
        self.connection = Some(conn);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let key = self.key(key);
        debug!("HMGET key={}", key);
        self.read(&key).await
    }

    async fn save(&self, key: &str, value: CacheValue, ttl_secs: u64) -> Result<()> {
        let key = self.key(key);
        let encoded = EncodedValue::encode(&value)?;
        debug!("HSET key={}, tag={}, ttl={}", key, encoded.tag.as_str(), ttl_secs);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("HSET")
            .arg(&key)
            .arg(TYPE_FIELD)
            .arg(encoded.tag.as_str())
            .arg(VALUE_FIELD)
            .arg(&encoded.payload)
            .ignore();

        match redis_expire_at(chrono::Utc::now().timestamp(), ttl_secs) {
            Some(expire_at) => pipe.cmd("EXPIREAT").arg(&key).arg(expire_at).ignore(),
            None => pipe.cmd("PERSIST").arg(&key).ignore(),
        };

        let mut conn = self.connection()?;
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let key = self.key(key);
        debug!("DEL key={}", key);

        let mut conn = self.connection()?;
        let removed: i64 = redis::cmd("DEL").arg(&key).query_async(&mut conn).await?;
        Ok(removed == 1)
    }

    async fn increment(&self, key: &str, offset: i64) -> Result<i64> {
        self.add(key, offset).await
    }

    async fn decrement(&self, key: &str, offset: i64) -> Result<i64> {
        let delta = offset
            .checked_neg()
            .ok_or_else(|| CacheError::InvalidValue(format!("offset {offset} out of range")))?;
        self.add(key, delta).await
    }

    async fn clean(&self) -> Result<()> {
        let mut conn = self.connection()?;
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        info!("Flushed redis db {}", self.options.database);
        Ok(())
    }

    async fn cache_info(&self) -> Result<CacheInfo> {
        let mut conn = self.connection()?;
        let raw: String = redis::cmd("INFO").query_async(&mut conn).await?;
        Ok(parse_info(&raw))
    }

    async fn metadata(&self, key: &str) -> Result<Option<MetadataRecord>> {
        let key = self.key(key);
        let Some(data) = self.read(&key).await? else {
            return Ok(None);
        };

        let mut conn = self.connection()?;
        let ttl: i64 = redis::cmd("TTL").arg(&key).query_async(&mut conn).await?;

        let expire_at = match ttl {
            // Expired between the two calls
            -2 => return Ok(None),
            t if t < 0 => None,
            t => Some(chrono::Utc::now().timestamp().saturating_add(t)),
        };

        Ok(Some(MetadataRecord {
            expire_at,
            data: Some(data),
            ttl: u64::try_from(ttl).ok(),
            ..Default::default()
        }))
    }

    fn is_supported(&self) -> bool {
        let probe = self
            .connection_info()
            .and_then(|info| Client::open(info).map_err(CacheError::from));

        match probe {
            Ok(_) => true,
            Err(e) => {
                warn!("Redis handler unsupported: {}", e);
                false
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.connection.take().is_some() {
            debug!("Closed redis connection");
        }
        Ok(())
    }
}

/// `EXPIREAT` argument for a save, `None` when the key should not expire
fn redis_expire_at(now: i64, ttl_secs: u64) -> Option<i64> {
    expiry_timestamp(now, ttl_secs).filter(|at| *at <= REDIS_MAX_EXPIRE_AT)
}

/// Turn the text returned by `INFO` into `{section: {field: value}}`
fn parse_info(raw: &str) -> Value {
    let mut sections = Map::new();
    let mut current = "default".to_string();

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(name) = line.strip_prefix('#') {
            current = name.trim().to_lowercase();
            continue;
        }

        if let Some((field, value)) = line.split_once(':') {
            let section = sections
                .entry(current.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = section {
                map.insert(field.to_string(), Value::String(value.to_string()));
            }
        }
    }

    Value::Object(sections)
}
