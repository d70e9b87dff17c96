// Memory handler integration tests
// Exercise the envelope path, raw counters, prefixes and metadata through the factory

use polycache::{BackendConfig, CacheHandler, CacheValue, select};
use serde_json::json;
use std::time::Duration;

const HOST: &str = "memory-tests";

async fn open(port: u16, prefix: &str, raw: bool) -> Box<dyn CacheHandler> {
    let config = BackendConfig::default()
        .with_address(HOST, port)
        .with_prefix(prefix)
        .with_raw(raw);
    select(&config, Some("memory"), None).await.unwrap()
}

fn sample_values() -> Vec<CacheValue> {
    vec![
        CacheValue::Bool(true),
        CacheValue::Bool(false),
        CacheValue::Int(0),
        CacheValue::Int(i64::MIN),
        CacheValue::Float(-3.25),
        CacheValue::Text(String::new()),
        CacheValue::Text("1".into()),
        CacheValue::Null,
        CacheValue::Structured(json!(["a", 1, 2.5, null, true])),
        CacheValue::Structured(json!({"name": "polycache", "tags": ["x"]})),
    ]
}

#[tokio::test]
async fn test_roundtrip_every_kind_enveloped() {
    let cache = open(1, "rt_", false).await;

    for (i, value) in sample_values().into_iter().enumerate() {
        let key = format!("v{i}");
        cache.save(&key, value.clone(), 60).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(value), "key {key}");
    }
}

#[tokio::test]
async fn test_roundtrip_every_kind_raw() {
    let cache = open(2, "rt_", true).await;

    for (i, value) in sample_values().into_iter().enumerate() {
        let key = format!("v{i}");
        cache.save(&key, value.clone(), 60).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(value), "key {key}");
    }
}

#[tokio::test]
async fn test_delete_then_get() {
    let cache = open(3, "del_", false).await;

    cache.save("k", CacheValue::from("v"), 60).await.unwrap();
    assert!(cache.delete("k").await.unwrap());
    assert_eq!(cache.get("k").await.unwrap(), None);
    assert!(!cache.delete("k").await.unwrap());
}

#[tokio::test]
async fn test_increment_decrement_restore_value() {
    let cache = open(4, "ctr_", true).await;
    cache.save("n", CacheValue::Int(7), 60).await.unwrap();

    assert_eq!(cache.increment("n", 5).await.unwrap(), 12);
    assert_eq!(cache.decrement("n", 5).await.unwrap(), 7);
    assert_eq!(cache.get("n").await.unwrap(), Some(CacheValue::Int(7)));
}

#[tokio::test]
async fn test_decrement_goes_below_zero() {
    let cache = open(5, "ctr_", true).await;
    cache.save("n", CacheValue::Int(1), 60).await.unwrap();

    assert_eq!(cache.decrement("n", 3).await.unwrap(), -2);
}

#[tokio::test]
async fn test_increment_missing_key_fails() {
    let cache = open(6, "ctr_", true).await;
    assert!(cache.increment("missing", 1).await.is_err());
    assert_eq!(cache.get("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_counters_refused_without_raw_mode() {
    let cache = open(7, "ctr_", false).await;
    cache.save("n", CacheValue::Int(10), 60).await.unwrap();

    assert!(cache.increment("n", 1).await.is_err());
    assert!(cache.decrement("n", 1).await.is_err());
    assert_eq!(cache.get("n").await.unwrap(), Some(CacheValue::Int(10)));
}

#[tokio::test]
async fn test_prefixes_isolate_keys_on_same_backend() {
    let a = open(8, "a_", false).await;
    let b = open(8, "b_", false).await;

    a.save("user", CacheValue::from("alice"), 60).await.unwrap();
    b.save("user", CacheValue::from("bob"), 60).await.unwrap();

    assert_eq!(a.get("user").await.unwrap(), Some(CacheValue::from("alice")));
    assert_eq!(b.get("user").await.unwrap(), Some(CacheValue::from("bob")));

    b.delete("user").await.unwrap();
    assert_eq!(a.get("user").await.unwrap(), Some(CacheValue::from("alice")));
}

#[tokio::test]
async fn test_clean_flushes_every_prefix() {
    let a = open(9, "a_", false).await;
    let b = open(9, "b_", false).await;

    a.save("k", CacheValue::Int(1), 60).await.unwrap();
    b.save("k", CacheValue::Int(2), 60).await.unwrap();

    a.clean().await.unwrap();

    assert_eq!(a.get("k").await.unwrap(), None);
    assert_eq!(b.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_metadata_expiry_matches_ttl() {
    let cache = open(10, "meta_", false).await;

    let before = chrono::Utc::now().timestamp();
    cache.save("k", CacheValue::Int(5), 60).await.unwrap();

    let meta = cache.metadata("k").await.unwrap().unwrap();
    let expire_at = meta.expire_at.unwrap();
    assert!((expire_at - (before + 60)).abs() <= 1);
    assert_eq!(meta.ttl, Some(60));
    assert_eq!(meta.data, Some(CacheValue::Int(5)));
}

#[tokio::test]
async fn test_metadata_absent_key() {
    let cache = open(11, "meta_", false).await;
    assert_eq!(cache.metadata("nothing").await.unwrap(), None);
}

#[tokio::test]
async fn test_items_expire() {
    let cache = open(12, "ttl_", false).await;
    cache.save("short", CacheValue::from("v"), 1).await.unwrap();
    cache.save("forever", CacheValue::from("v"), 0).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(cache.get("short").await.unwrap(), None);
    assert_eq!(cache.get("forever").await.unwrap(), Some(CacheValue::from("v")));
}

#[tokio::test]
async fn test_unencodable_value_is_a_failed_save() {
    let cache = open(13, "bad_", false).await;

    assert!(cache.save("nan", CacheValue::Float(f64::NAN), 60).await.is_err());
    assert_eq!(cache.get("nan").await.unwrap(), None);
}

#[tokio::test]
async fn test_cache_info_reports_store_stats() {
    let cache = open(14, "info_", false).await;
    cache.save("k", CacheValue::Int(1), 60).await.unwrap();
    cache.get("k").await.unwrap();

    let info = cache.cache_info().await.unwrap();
    assert_eq!(info["address"], format!("{HOST}:14"));
    assert_eq!(info["sets"], 1);
    assert_eq!(info["hits"], 1);
    assert_eq!(info["hit_rate"], 1.0);
}

#[tokio::test]
async fn test_huge_ttl_never_expires() {
    let cache = open(15, "huge_", false).await;

    for ttl in [1 << 63, u64::MAX] {
        cache.save("k", CacheValue::Int(1), ttl).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(CacheValue::Int(1)));

        let meta = cache.metadata("k").await.unwrap().unwrap();
        assert_eq!(meta.ttl, Some(ttl));
        assert_eq!(meta.expire_at, Some(i64::MAX));
    }
}
