//! Orchestration: own the live document, reload it on file changes, and
//! keep the store eventually consistent with the file.

use crate::document::Document;
use crate::error::Result;
use crate::store::{self, KeyValueStore};
use crate::watch::{DEFAULT_DEBOUNCE, FileWatcher};
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Owns the authoritative in-memory configuration and republishes it into
/// the store whenever the file changes.
///
/// The document sits behind an `ArcSwap`: readers always see a complete
/// document and a reload replaces it wholesale. The watch loop in [`run`]
/// consumes file events sequentially, so at most one reload is ever in
/// flight and each reload (including its publish) completes before the next
/// event is taken.
///
/// [`run`]: ConfigSync::run
pub struct ConfigSync<S> {
    document: ArcSwap<Document>,
    store: S,
    path: PathBuf,
    debounce: Duration,
}

impl<S: KeyValueStore> ConfigSync<S> {
    /// Create a sync from an already-loaded document.
    pub fn new(path: impl Into<PathBuf>, document: Document, store: S) -> Self {
        Self {
            document: ArcSwap::new(Arc::new(document)),
            store,
            path: path.into(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Load the configuration file and create a sync for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed. At startup the
    /// caller treats this as fatal; there is no partial-config fallback.
    pub fn load(path: impl AsRef<Path>, store: S) -> Result<Self> {
        let path = path.as_ref();
        let document = Document::load(path)?;
        Ok(Self::new(path, document, store))
    }

    /// Override the watcher debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Get a handle to the current in-memory document.
    pub fn document(&self) -> Arc<Document> {
        self.document.load_full()
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Publish the current document into the store.
    ///
    /// Pings first; if the store is unavailable the cycle is skipped with an
    /// error log and no retry — that is not a failure of the sync itself.
    ///
    /// # Errors
    ///
    /// Returns an error if a store write fails mid-publish. Earlier writes
    /// are not rolled back.
    pub async fn publish(&self) -> Result<()> {
        if !self.store.ping().await {
            error!("connection to the store failed, skipping publish cycle");
            return Ok(());
        }

        store::publish_all(&self.store, &self.document()).await
    }

    /// Re-read the configuration file, swap it in, and republish.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can no longer be read or parsed; in that
    /// case the previous in-memory document is retained and the store is not
    /// touched, so file and store may diverge until the next valid change.
    pub async fn reload(&self) -> Result<()> {
        let document = Document::load(&self.path)?;
        self.document.store(Arc::new(document));
        self.publish().await
    }

    /// Publish once, then watch the file and republish on every change.
    ///
    /// Runs until the watch channel closes. Reload failures are logged and
    /// absorbed; only a failure to register the watch itself ends the loop.
    pub async fn run(&self) -> Result<()> {
        if let Err(e) = self.publish().await {
            error!(error = %e, "initial publish failed");
        }

        let (_watcher, mut rx) = FileWatcher::new(&self.path, self.debounce)?;
        info!(file = %self.path.display(), "watching configuration file");

        while let Some(()) = rx.recv().await {
            match self.reload().await {
                Ok(()) => {
                    info!(
                        file = %self.path.display(),
                        "configuration file changed and settings have been refreshed"
                    );
                }
                Err(e) => {
                    error!(error = %e, "reload failed, keeping previous configuration");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::fs;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct MockStore {
        reachable: AtomicBool,
        scalars: Mutex<HashMap<String, String>>,
        sets: Mutex<HashMap<String, HashSet<String>>>,
    }

    impl MockStore {
        fn reachable() -> Self {
            let store = Self::default();
            store.reachable.store(true, Ordering::SeqCst);
            store
        }

        fn unreachable() -> Self {
            Self::default()
        }

        fn write_count(&self) -> usize {
            self.scalars.lock().unwrap().len() + self.sets.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl KeyValueStore for MockStore {
        async fn ping(&self) -> bool {
            self.reachable.load(Ordering::SeqCst)
        }

        async fn set_string(&self, key: &str, value: &str) -> Result<()> {
            self.scalars.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        async fn set_int(&self, key: &str, value: i64) -> Result<()> {
            self.set_string(key, &value.to_string()).await
        }

        async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
            self.set_int(key, i64::from(value)).await
        }

        async fn add_list_members(&self, key: &str, members: &[String]) -> Result<()> {
            if members.is_empty() {
                return Ok(());
            }
            self.sets
                .lock()
                .unwrap()
                .entry(key.into())
                .or_default()
                .extend(members.iter().cloned());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> Result<String> {
            Ok(self.scalars.lock().unwrap().get(key).cloned().unwrap_or_default())
        }

        async fn get_int(&self, key: &str) -> Result<i64> {
            Ok(self.get_string(key).await?.parse().unwrap_or_default())
        }

        async fn get_bool(&self, key: &str) -> Result<bool> {
            Ok(self.get_int(key).await? == 1)
        }

        async fn get_string_list(&self, key: &str) -> Result<Vec<String>> {
            Ok(self
                .sets
                .lock()
                .unwrap()
                .get(key)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default())
        }
    }

    fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("twitch-bot.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_missing_file_is_an_error() {
        let result = ConfigSync::load("/nonexistent/twitch-bot.yaml", MockStore::reachable());
        assert!(matches!(result, Err(SyncError::LoadError(_))));
    }

    #[tokio::test]
    async fn test_publish_writes_registry_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "irc:\n  nickname: streambot\n  ssl: true\n");

        let sync = ConfigSync::load(&path, MockStore::reachable()).unwrap();
        sync.publish().await.unwrap();

        assert_eq!(sync.store.get_string("irc.nickname").await.unwrap(), "streambot");
        assert!(sync.store.get_bool("irc.ssl").await.unwrap());
        // Absent registry keys still publish zero values.
        assert_eq!(sync.store.get_int("redis.port").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_store_skips_publish() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "irc:\n  nickname: streambot\n");

        let sync = ConfigSync::load(&path, MockStore::unreachable()).unwrap();
        // Skipped cycle is absorbed, not an error.
        sync.publish().await.unwrap();

        assert_eq!(sync.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_reload_swaps_document_and_republishes() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "irc:\n  nickname: streambot\n");

        let sync = ConfigSync::load(&path, MockStore::reachable()).unwrap();
        sync.publish().await.unwrap();

        fs::write(&path, "irc:\n  nickname: otherbot\n").unwrap();
        sync.reload().await.unwrap();

        assert_eq!(sync.document().get_string("irc.nickname"), "otherbot");
        assert_eq!(sync.store.get_string("irc.nickname").await.unwrap(), "otherbot");
    }

    #[tokio::test]
    async fn test_malformed_reload_retains_previous_document() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "irc:\n  nickname: streambot\n");

        let sync = ConfigSync::load(&path, MockStore::reachable()).unwrap();
        sync.publish().await.unwrap();

        fs::write(&path, "irc: [unclosed\n").unwrap();
        let result = sync.reload().await;

        assert!(matches!(result, Err(SyncError::ParseError(_))));
        assert_eq!(sync.document().get_string("irc.nickname"), "streambot");
        assert_eq!(sync.store.get_string("irc.nickname").await.unwrap(), "streambot");
    }
}
