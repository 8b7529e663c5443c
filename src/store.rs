//! The key-value publisher: typed reads and writes against the store.

use crate::document::Document;
use crate::error::Result;
use crate::registry::{self, ValueKind};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::OnceCell;
use tracing::warn;

/// Default store port when `REDIS_PORT` is unset or non-numeric.
pub const DEFAULT_PORT: u16 = 6379;

/// Default database index when `REDIS_DATABASE` is unset or non-numeric.
pub const DEFAULT_DATABASE: i64 = 0;

/// Connection settings for the key-value store.
///
/// These come from the process environment, not from the document — the
/// document's `redis.*` keys are published like any other registry entry and
/// are never used to open the connection.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Store host, from `REDIS_URI`.
    pub uri: String,
    /// Store port, from `REDIS_PORT`.
    pub port: u16,
    /// Store password, from `REDIS_PASSWORD`. Empty means no auth.
    pub password: String,
    /// Database index, from `REDIS_DATABASE`.
    pub database: i64,
}

impl StoreSettings {
    /// Read settings from the process environment, falling back to defaults
    /// for missing or non-numeric values.
    pub fn from_env() -> Self {
        let port = match std::env::var("REDIS_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(%raw, default = u64::from(DEFAULT_PORT), "REDIS_PORT is not numeric, using default");
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let database = match std::env::var("REDIS_DATABASE") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(%raw, default = DEFAULT_DATABASE, "REDIS_DATABASE is not numeric, using default");
                DEFAULT_DATABASE
            }),
            Err(_) => DEFAULT_DATABASE,
        };

        Self {
            uri: std::env::var("REDIS_URI").unwrap_or_default(),
            port,
            password: std::env::var("REDIS_PASSWORD").unwrap_or_default(),
            database,
        }
    }

    /// Render the settings as a `redis://` connection URL.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.uri, self.port, self.database)
        } else {
            format!("redis://:{}@{}:{}/{}", self.password, self.uri, self.port, self.database)
        }
    }
}

/// Typed access to the key-value store.
///
/// This is the seam between the synchronization logic and the Redis
/// transport; tests implement it in memory. Store keys are the document's
/// dot-paths verbatim. All writes are unexpiring.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Liveness probe. `false` means "store unavailable": the caller logs an
    /// error and skips the publish cycle, with no retry.
    async fn ping(&self) -> bool;

    /// Write a string value.
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Write an integer value.
    async fn set_int(&self, key: &str, value: i64) -> Result<()>;

    /// Write a boolean as integer 1 or 0; there is no boolean wire type.
    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Add members to a set-typed key. Previously added members are never
    /// removed, so a list that shrinks in the document leaves orphaned
    /// members behind.
    async fn add_list_members(&self, key: &str, members: &[String]) -> Result<()>;

    /// Read a string value, or `""` if the key is absent.
    async fn get_string(&self, key: &str) -> Result<String>;

    /// Read an integer value; absent or unparseable values coerce to 0.
    async fn get_int(&self, key: &str) -> Result<i64>;

    /// Read a boolean value; anything other than integer 1 reads as `false`.
    async fn get_bool(&self, key: &str) -> Result<bool>;

    /// Read the members of a set-typed key, in no particular order.
    async fn get_string_list(&self, key: &str) -> Result<Vec<String>>;
}

/// Write every registry key from the document into the store.
///
/// Each key is read with its category's typed accessor (zero value if absent
/// in the document) and written under the identical dot-path, with no
/// expiration. Scalar writes overwrite; list writes only add members.
///
/// # Errors
///
/// Returns the first store write error; earlier writes are not rolled back
/// (there is no atomicity across keys).
pub async fn publish_all<S: KeyValueStore + ?Sized>(store: &S, document: &Document) -> Result<()> {
    for spec in registry::REGISTRY {
        match spec.kind {
            ValueKind::String => {
                store.set_string(spec.path, &document.get_string(spec.path)).await?;
            }
            ValueKind::Int => {
                store.set_int(spec.path, document.get_int(spec.path)).await?;
            }
            ValueKind::Bool => {
                store.set_bool(spec.path, document.get_bool(spec.path)).await?;
            }
            ValueKind::StringList => {
                store
                    .add_list_members(spec.path, &document.get_string_list(spec.path))
                    .await?;
            }
        }
    }

    Ok(())
}

/// Redis-backed implementation of [`KeyValueStore`].
///
/// Owns one live link for the process lifetime: the connection is
/// established lazily on first use and then shared by every operation. No
/// pooling, no reconnect logic of our own, and the connection is never
/// explicitly closed.
pub struct RedisStore {
    client: redis::Client,
    conn: OnceCell<MultiplexedConnection>,
}

impl RedisStore {
    /// Build a store handle from connection settings.
    ///
    /// Does not verify reachability; [`KeyValueStore::ping`] is the probe
    /// for that.
    ///
    /// # Errors
    ///
    /// Returns an error only if the settings do not form a valid connection
    /// URL.
    pub fn connect(settings: &StoreSettings) -> Result<Self> {
        let client = redis::Client::open(settings.url())?;

        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let conn = self
            .conn
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await?;

        Ok(conn.clone())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn ping(&self) -> bool {
        let Ok(mut conn) = self.connection().await else {
            return false;
        };

        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        matches!(pong, Ok(reply) if reply.eq_ignore_ascii_case("PONG"))
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_int(key, i64::from(value)).await
    }

    async fn add_list_members(&self, key: &str, members: &[String]) -> Result<()> {
        // SADD with no members is a protocol error; an empty list is a no-op.
        if members.is_empty() {
            return Ok(());
        }

        let mut conn = self.connection().await?;
        let _: () = conn.sadd(key, members).await?;
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<String> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value.unwrap_or_default())
    }

    async fn get_int(&self, key: &str) -> Result<i64> {
        let raw = self.get_string(key).await?;
        Ok(raw.parse().unwrap_or_default())
    }

    async fn get_bool(&self, key: &str) -> Result<bool> {
        Ok(self.get_int(key).await? == 1)
    }

    async fn get_string_list(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }
}
