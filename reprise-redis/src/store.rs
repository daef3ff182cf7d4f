//! Redis store implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::{Client, Script, aio::ConnectionManager};
use reprise_backend::{Batch, Command, KeyValueStore, StoreError, StoreResult};
use reprise_core::StoreLabel;
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::Error;

/// Validates every command of a batch before applying any of them.
const BATCH_SCRIPT: &str = include_str!("batch.lua");

/// Redis key-value store based on the redis-rs crate.
///
/// It uses a [`ConnectionManager`] for asynchronous network interaction. The
/// connection is opened on the first command, not on construction.
///
/// Batches run as one Lua script: type and integer checks for all commands
/// happen before the first write, so a rejected batch leaves no trace.
///
/// [`ConnectionManager`]: redis::aio::ConnectionManager
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    batch_script: Script,
    label: StoreLabel,
}

impl RedisStore {
    /// Create new store instance connected to `redis://127.0.0.1/`.
    ///
    /// # Examples
    /// ```no_run
    /// use reprise_redis::RedisStore;
    ///
    /// let store = RedisStore::new()?;
    /// # Ok::<(), reprise_redis::Error>(())
    /// ```
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Creates new RedisStore builder with default settings.
    #[must_use]
    pub fn builder() -> RedisStoreBuilder {
        RedisStoreBuilder::default()
    }

    /// Create lazy connection to redis via [`ConnectionManager`]
    pub async fn connection(&self) -> Result<&ConnectionManager, Error> {
        trace!("Get connection manager");
        let manager = self
            .connection
            .get_or_try_init(|| {
                trace!("Initialize new redis connection manager");
                self.client.get_connection_manager()
            })
            .await?;
        Ok(manager)
    }

    async fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> StoreResult<T> {
        let mut con = self.connection().await?.clone();
        let value = cmd.query_async(&mut con).await.map_err(Error::from)?;
        Ok(value)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("label", &self.label)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

/// Part of builder pattern implementation for RedisStore.
pub struct RedisStoreBuilder {
    connection_info: String,
    label: StoreLabel,
}

impl Default for RedisStoreBuilder {
    fn default() -> Self {
        Self {
            connection_info: "redis://127.0.0.1/".to_owned(),
            label: StoreLabel::new_static("redis"),
        }
    }
}

impl RedisStoreBuilder {
    /// Set connection info (host, port, database, etc.) for RedisStore.
    pub fn server(mut self, connection_info: impl Into<String>) -> Self {
        self.connection_info = connection_info.into();
        self
    }

    /// Set a custom label for this store, used in tracing and metrics.
    pub fn label(mut self, label: impl Into<StoreLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Create new instance of Redis store with passed settings.
    pub fn build(self) -> Result<RedisStore, Error> {
        Ok(RedisStore {
            client: Client::open(self.connection_info)?,
            connection: OnceCell::new(),
            batch_script: Script::new(BATCH_SCRIPT),
            label: self.label,
        })
    }
}

fn expiry_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let value: Option<Vec<u8>> = self.query(redis::cmd("GET").arg(key)).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.query(redis::cmd("SET").arg(key).arg(value.as_ref()))
            .await
    }

    async fn set_with_expiry(&self, key: &str, value: Bytes, ttl: Duration) -> StoreResult<()> {
        // SET .. PX keeps sub-second precision that SETEX would round away
        self.query(
            redis::cmd("SET")
                .arg(key)
                .arg(value.as_ref())
                .arg("PX")
                .arg(expiry_millis(ttl)),
        )
        .await
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        self.query(redis::cmd("INCR").arg(key)).await
    }

    async fn append_to_list(&self, key: &str, value: Bytes) -> StoreResult<u64> {
        self.query(redis::cmd("RPUSH").arg(key).arg(value.as_ref()))
            .await
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Bytes>> {
        let values: Vec<Vec<u8>> = self
            .query(redis::cmd("LRANGE").arg(key).arg(start).arg(stop))
            .await?;
        Ok(values.into_iter().map(Bytes::from).collect())
    }

    async fn flush(&self) -> StoreResult<()> {
        self.query(&redis::cmd("FLUSHDB")).await
    }

    async fn execute(&self, batch: Batch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut con = self.connection().await?.clone();

        let mut invocation = self.batch_script.prepare_invoke();
        for command in batch {
            match command {
                Command::Set { key, value } => {
                    invocation.key(key).arg("SET").arg(value.as_ref()).arg(0);
                }
                Command::SetWithExpiry { key, value, ttl } => {
                    invocation
                        .key(key)
                        .arg("SETPX")
                        .arg(value.as_ref())
                        .arg(expiry_millis(ttl));
                }
                Command::Increment { key } => {
                    invocation.key(key).arg("INCR").arg("").arg(0);
                }
                Command::AppendToList { key, value } => {
                    invocation.key(key).arg("RPUSH").arg(value.as_ref()).arg(0);
                }
            }
        }

        trace!("EVALSHA batch");
        invocation
            .invoke_async::<()>(&mut con)
            .await
            .map_err(Error::from)
            .map_err(StoreError::from)
    }

    fn label(&self) -> StoreLabel {
        self.label.clone()
    }
}
