//! InstrumentedCache over the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use reprise::{CacheError, InstrumentedCache, KeyValueStore, STORE_OPERATION};
use reprise_memory::MemoryStore;

async fn fresh_cache() -> (Arc<MemoryStore>, InstrumentedCache<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let cache = InstrumentedCache::new(store.clone()).await.unwrap();
    (store, cache)
}

#[tokio::test]
async fn test_counter_matches_number_of_store_calls() {
    let (_, cache) = fresh_cache().await;

    for n in 0..25 {
        cache.store(n).await.unwrap();
    }

    assert_eq!(cache.call_count(STORE_OPERATION).await.unwrap(), 25);
}

#[tokio::test]
async fn test_histories_stay_aligned() {
    let (_, cache) = fresh_cache().await;

    let mut keys = Vec::new();
    keys.push(cache.store("text").await.unwrap());
    keys.push(cache.store(Bytes::from_static(b"\x01\x02")).await.unwrap());
    keys.push(cache.store(7).await.unwrap());
    keys.push(cache.store(1.5).await.unwrap());

    let history = cache.history(STORE_OPERATION).await.unwrap();
    assert_eq!(history.inputs.len(), history.outputs.len());
    assert_eq!(
        history.inputs,
        vec![r#"("text",)"#, r#"(b"\x01\x02",)"#, "(7,)", "(1.5,)"]
    );
    let recorded: Vec<&str> = history.outputs.iter().map(String::as_str).collect();
    let returned: Vec<&str> = keys.iter().map(|key| key.as_str()).collect();
    assert_eq!(recorded, returned);
}

#[tokio::test]
async fn test_keys_are_fresh_for_identical_data() {
    let (_, cache) = fresh_cache().await;

    let keys: HashSet<_> = store_many(&cache, 50).await;
    assert_eq!(keys.len(), 50);
}

async fn store_many(
    cache: &InstrumentedCache<MemoryStore>,
    n: usize,
) -> HashSet<String> {
    let mut keys = HashSet::new();
    for _ in 0..n {
        keys.insert(cache.store("same").await.unwrap().to_string());
    }
    keys
}

#[tokio::test]
async fn test_get_returns_stored_bytes() {
    let (_, cache) = fresh_cache().await;

    let text = cache.store("hello").await.unwrap();
    let int = cache.store(-42).await.unwrap();
    let float = cache.store(3.0).await.unwrap();

    assert_eq!(cache.get(&text).await.unwrap(), Some(Bytes::from("hello")));
    assert_eq!(cache.get(&int).await.unwrap(), Some(Bytes::from("-42")));
    assert_eq!(cache.get(&float).await.unwrap(), Some(Bytes::from("3.0")));
}

#[tokio::test]
async fn test_get_absent_key_is_none() {
    let (_, cache) = fresh_cache().await;

    assert_eq!(cache.get("never-stored").await.unwrap(), None);

    let mut decoder_called = false;
    let decoded = cache
        .get_with("never-stored", |raw| {
            decoder_called = true;
            String::from_utf8(raw.to_vec())
        })
        .await
        .unwrap();
    assert_eq!(decoded, None);
    assert!(!decoder_called);
}

#[tokio::test]
async fn test_get_with_decoder() {
    let (_, cache) = fresh_cache().await;
    let key = cache.store("shout").await.unwrap();

    let upper = cache
        .get_with(&key, |raw| {
            String::from_utf8(raw.to_vec()).map(|text| text.to_uppercase())
        })
        .await
        .unwrap();
    assert_eq!(upper.as_deref(), Some("SHOUT"));
}

#[tokio::test]
async fn test_decoder_failure_propagates() {
    let (_, cache) = fresh_cache().await;
    let key = cache.store("not a number").await.unwrap();

    let result = cache
        .get_with(&key, |raw| {
            std::str::from_utf8(&raw)
                .map_err(reprise::BoxError::from)?
                .parse::<u32>()
                .map_err(reprise::BoxError::from)
        })
        .await;
    assert!(matches!(result, Err(CacheError::Decode(_))));
}

#[tokio::test]
async fn test_get_str() {
    let (_, cache) = fresh_cache().await;
    let key = cache.store("héllo").await.unwrap();
    let empty = cache.store("").await.unwrap();

    assert_eq!(cache.get_str(&key).await.unwrap(), "héllo");
    assert_eq!(cache.get_str(&empty).await.unwrap(), "");
    assert_eq!(cache.get_str("absent").await.unwrap(), "");
}

#[tokio::test]
async fn test_get_str_rejects_invalid_utf8() {
    let (_, cache) = fresh_cache().await;
    let key = cache.store(vec![0xffu8, 0xfe]).await.unwrap();

    assert!(matches!(
        cache.get_str(&key).await,
        Err(CacheError::Decode(_))
    ));
}

#[tokio::test]
async fn test_get_int() {
    let (_, cache) = fresh_cache().await;
    let number = cache.store(1024).await.unwrap();
    let negative = cache.store("-7").await.unwrap();
    let text = cache.store("twelve").await.unwrap();
    let float = cache.store(2.5).await.unwrap();

    assert_eq!(cache.get_int(&number).await.unwrap(), 1024);
    assert_eq!(cache.get_int(&negative).await.unwrap(), -7);
    assert_eq!(cache.get_int(&text).await.unwrap(), 0);
    assert_eq!(cache.get_int(&float).await.unwrap(), 0);
    assert_eq!(cache.get_int("absent").await.unwrap(), 0);
}

#[tokio::test]
async fn test_construction_flushes_store() {
    let store = Arc::new(MemoryStore::new());
    store.set("foreign", Bytes::from("x")).await.unwrap();

    let first = InstrumentedCache::new(store.clone()).await.unwrap();
    let key = first.store("old").await.unwrap();
    assert_eq!(first.call_count(STORE_OPERATION).await.unwrap(), 1);

    let second = InstrumentedCache::new(store.clone()).await.unwrap();
    assert_eq!(second.get(&key).await.unwrap(), None);
    assert_eq!(second.call_count(STORE_OPERATION).await.unwrap(), 0);
    assert!(second.history(STORE_OPERATION).await.unwrap().inputs.is_empty());
    assert_eq!(store.get("foreign").await.unwrap(), None);
}

#[tokio::test]
async fn test_namespace_prefixes_keys() {
    let store = Arc::new(MemoryStore::new());
    let cache = InstrumentedCache::builder(store.clone())
        .namespace("s1")
        .build()
        .await
        .unwrap();

    let key = cache.store("scoped").await.unwrap();

    assert_eq!(cache.get_str(&key).await.unwrap(), "scoped");
    assert_eq!(
        store.get(&format!("s1:{key}")).await.unwrap(),
        Some(Bytes::from("scoped"))
    );
    assert_eq!(store.get("s1:store").await.unwrap(), Some(Bytes::from("1")));
    assert_eq!(store.get("store").await.unwrap(), None);
    assert_eq!(cache.call_count(STORE_OPERATION).await.unwrap(), 1);
    assert_eq!(cache.operation().as_str(), "s1:store");
}

#[tokio::test]
async fn test_shared_store_through_trait_object() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let cache = InstrumentedCache::new(store).await.unwrap();

    let key = cache.store("dyn").await.unwrap();
    assert_eq!(cache.get_str(&key).await.unwrap(), "dyn");
}

#[tokio::test]
async fn test_rejected_store_call_leaves_history_untouched() {
    let (store, cache) = fresh_cache().await;
    cache.store("a").await.unwrap();
    store.set("store:outputs", Bytes::from("x")).await.unwrap();

    let result = cache.store("b").await;

    assert!(matches!(result, Err(CacheError::Store(_))));
    assert_eq!(cache.call_count(STORE_OPERATION).await.unwrap(), 1);
    assert_eq!(
        store.list_range("store:inputs", 0, -1).await.unwrap(),
        vec![Bytes::from(r#"("a",)"#)]
    );
    assert_eq!(store.get("store:outputs").await.unwrap(), Some(Bytes::from("x")));
}
