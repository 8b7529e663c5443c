//! Shared in-memory store used by the integration tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use twitch_bot_config::prelude::*;

/// In-memory [`KeyValueStore`] mirroring the store's observable semantics:
/// scalar keys overwrite, set keys only accumulate, booleans are 1/0.
#[derive(Default)]
pub struct MemoryStore {
    reachable: AtomicBool,
    scalars: Mutex<HashMap<String, String>>,
    sets: Mutex<HashMap<String, HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.reachable.store(true, Ordering::SeqCst);
        store
    }

    #[allow(dead_code)]
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn key_count(&self) -> usize {
        self.scalars.lock().unwrap().len() + self.sets.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn members(&self, key: &str) -> HashSet<String> {
        self.sets.lock().unwrap().get(key).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
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
