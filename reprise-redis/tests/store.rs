//! Tests against a live Redis server.
//!
//! Run with `REPRISE_REDIS_URL=redis://127.0.0.1/15 cargo test -- --ignored`.
//! Every test flushes the selected database.

use std::time::Duration;

use bytes::Bytes;
use reprise_backend::{Batch, KeyValueStore, StoreError};
use reprise_redis::RedisStore;

fn store() -> RedisStore {
    let url = std::env::var("REPRISE_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/15".into());
    RedisStore::builder().server(url).build().unwrap()
}

#[test]
fn test_invalid_url_is_rejected() {
    assert!(RedisStore::builder().server("not-a-valid-url").build().is_err());
}

#[tokio::test]
#[ignore = "requires a running redis server"]
async fn test_string_list_and_counter_commands() {
    let store = store();
    store.flush().await.unwrap();

    store.set("k", Bytes::from("v")).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some(Bytes::from("v")));
    assert_eq!(store.get("missing").await.unwrap(), None);

    assert_eq!(store.increment("n").await.unwrap(), 1);
    assert_eq!(store.increment("n").await.unwrap(), 2);

    store.append_to_list("l", Bytes::from("a")).await.unwrap();
    store.append_to_list("l", Bytes::from("b")).await.unwrap();
    assert_eq!(store.list_range("l", 0, -1).await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
#[ignore = "requires a running redis server"]
async fn test_expiry() {
    let store = store();
    store.flush().await.unwrap();

    store
        .set_with_expiry("page", Bytes::from("<html/>"), Duration::from_millis(200))
        .await
        .unwrap();
    assert!(store.get("page").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.get("page").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running redis server"]
async fn test_batch_and_flush() {
    let store = store();
    store.flush().await.unwrap();

    let batch = Batch::new()
        .append_to_list("store:inputs", "(\"a\",)")
        .set("key-1", "a")
        .append_to_list("store:outputs", "key-1")
        .increment("store");
    store.execute(batch).await.unwrap();

    assert_eq!(store.get("store").await.unwrap(), Some(Bytes::from("1")));
    assert_eq!(store.get("key-1").await.unwrap(), Some(Bytes::from("a")));

    store.flush().await.unwrap();
    assert_eq!(store.get("store").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running redis server"]
async fn test_wrong_type_is_internal_error() {
    let store = store();
    store.flush().await.unwrap();

    store.append_to_list("l", Bytes::from("a")).await.unwrap();
    let error = store.increment("l").await.unwrap_err();
    assert!(matches!(error, StoreError::InternalError(_)));
}

fn store_call(key: &str) -> Batch {
    Batch::new()
        .append_to_list("store:inputs", "(\"a\",)")
        .set(key, "a")
        .append_to_list("store:outputs", key.to_owned())
        .increment("store")
}

#[tokio::test]
#[ignore = "requires a running redis server"]
async fn test_rejected_batch_writes_nothing() {
    let store = store();
    store.flush().await.unwrap();
    store.execute(store_call("key-1")).await.unwrap();

    // The outputs list is clobbered by a plain string: the third command
    // of the next batch cannot run.
    store.set("store:outputs", Bytes::from("x")).await.unwrap();
    let error = store.execute(store_call("key-2")).await.unwrap_err();
    assert!(matches!(error, StoreError::InternalError(_)));

    assert_eq!(store.list_range("store:inputs", 0, -1).await.unwrap().len(), 1);
    assert_eq!(store.get("key-2").await.unwrap(), None);
    assert_eq!(store.get("store").await.unwrap(), Some(Bytes::from("1")));
    assert_eq!(store.get("store:outputs").await.unwrap(), Some(Bytes::from("x")));
}

#[tokio::test]
#[ignore = "requires a running redis server"]
async fn test_batch_rejects_non_integer_counter() {
    let store = store();
    store.flush().await.unwrap();
    store.set("store", Bytes::from("many")).await.unwrap();

    let error = store.execute(store_call("key-1")).await.unwrap_err();
    assert!(matches!(error, StoreError::InternalError(_)));
    assert!(error.to_string().contains("not an integer"));
    assert!(store.list_range("store:inputs", 0, -1).await.unwrap().is_empty());
    assert_eq!(store.get("key-1").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running redis server"]
async fn test_batch_rejects_counter_overflow() {
    let store = store();
    store.flush().await.unwrap();
    store
        .set("store", Bytes::from(i64::MAX.to_string()))
        .await
        .unwrap();

    assert!(store.execute(store_call("key-1")).await.is_err());
    assert!(store.list_range("store:inputs", 0, -1).await.unwrap().is_empty());
    assert_eq!(
        store.get("store").await.unwrap(),
        Some(Bytes::from(i64::MAX.to_string()))
    );
}

#[tokio::test]
#[ignore = "requires a running redis server"]
async fn test_batch_sees_its_own_writes() {
    let store = store();
    store.flush().await.unwrap();

    // SET then INCR on the same key inside one batch.
    let batch = Batch::new()
        .set("n", "41")
        .increment("n")
        .set_with_expiry("page", "<html/>", Duration::from_secs(10));
    store.execute(batch).await.unwrap();
    assert_eq!(store.get("n").await.unwrap(), Some(Bytes::from("42")));
    assert!(store.get("page").await.unwrap().is_some());

    let batch = Batch::new().set("n", "text").increment("n");
    assert!(store.execute(batch).await.is_err());
    assert_eq!(store.get("n").await.unwrap(), Some(Bytes::from("42")));
}
