// Redis handler tests against a live server on 127.0.0.1:6379
// Run with: cargo test --features redis-tests --test redis_handler_tests

#![cfg(feature = "redis-tests")]

use polycache::{BackendConfig, CacheError, CacheHandler, CacheValue, select};
use serde_json::json;

async fn open(prefix: &str) -> Box<dyn CacheHandler> {
    let mut config = BackendConfig::default().with_prefix(prefix);
    config.redis.database = 15;
    select(&config, Some("redis"), None).await.unwrap()
}

#[tokio::test]
async fn test_roundtrip_values() {
    let cache = open("polycache_rt_").await;

    let values = [
        CacheValue::Bool(false),
        CacheValue::Int(123),
        CacheValue::Float(9.75),
        CacheValue::from("redis"),
        CacheValue::Null,
        CacheValue::Structured(json!([{"a": 1}, {"b": [true, null]}])),
    ];

    for (i, value) in values.into_iter().enumerate() {
        let key = format!("k{i}");
        cache.save(&key, value.clone(), 60).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(value));
    }
}

#[tokio::test]
async fn test_delete_then_get() {
    let cache = open("polycache_del_").await;
    cache.save("k", CacheValue::Int(1), 60).await.unwrap();

    assert!(cache.delete("k").await.unwrap());
    assert_eq!(cache.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_counters() {
    let cache = open("polycache_ctr_").await;
    cache.save("n", CacheValue::Int(5), 60).await.unwrap();

    assert_eq!(cache.increment("n", 10).await.unwrap(), 15);
    assert_eq!(cache.decrement("n", 10).await.unwrap(), 5);
    assert_eq!(cache.get("n").await.unwrap(), Some(CacheValue::Int(5)));
}

#[tokio::test]
async fn test_increment_missing_key() {
    let cache = open("polycache_missing_").await;
    cache.delete("n").await.unwrap();

    let err = cache.increment("n", 1).await.unwrap_err();
    assert!(matches!(err, CacheError::KeyNotFound(_)));
    assert_eq!(cache.get("n").await.unwrap(), None);
}

#[tokio::test]
async fn test_metadata_uses_server_ttl() {
    let cache = open("polycache_meta_").await;
    let before = chrono::Utc::now().timestamp();
    cache.save("k", CacheValue::from("v"), 60).await.unwrap();

    let meta = cache.metadata("k").await.unwrap().unwrap();
    assert!((meta.expire_at.unwrap() - (before + 60)).abs() <= 1);
    assert_eq!(meta.data, Some(CacheValue::from("v")));
}

#[tokio::test]
async fn test_cache_info_sections() {
    let cache = open("polycache_info_").await;
    let info = cache.cache_info().await.unwrap();
    assert!(info["server"]["redis_version"].is_string());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let mut cache = open("polycache_close_").await;
    cache.close().await.unwrap();
    cache.close().await.unwrap();
    assert!(matches!(
        cache.get("k").await,
        Err(CacheError::ConnectionLost(_))
    ));
}
