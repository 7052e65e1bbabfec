//! Keyed in-memory stores backing the cloud's state.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use gridlink_types::SiteId;

use crate::error::CloudError;

/// A shared map supporting concurrency-safe point operations.
///
/// Every operation holds the lock for its full duration, so [`KvStore::take`]
/// is an indivisible check-and-remove. No ordering is guaranteed across
/// calls or across keys, and none is needed by the callers.
#[derive(Debug)]
pub struct KvStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for KvStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for KvStore<K, V> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> KvStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.read().await.get(key).cloned()
    }

    /// Insert or replace the value for `key`. Last writer wins.
    pub async fn put(&self, key: K, value: V) {
        self.inner.write().await.insert(key, value);
    }

    /// Remove and return the value for `key` in a single critical section.
    pub async fn take(&self, key: &K) -> Option<V> {
        self.inner.write().await.remove(key)
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.inner.read().await.contains_key(key)
    }

    /// Snapshot of all entries at the time of the call.
    pub async fn entries(&self) -> Vec<(K, V)> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Maps a site to its current desired configuration.
///
/// Pure key-value: a write replaces the whole document, no merge and no
/// history. Sites come into existence on first write and are never deleted.
#[derive(Clone, Debug, Default)]
pub struct ConfigStore {
    configs: KvStore<SiteId, Value>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace (or create) the stored configuration for `site_id`.
    pub async fn put(&self, site_id: SiteId, config: Value) {
        self.configs.put(site_id, config).await;
    }

    /// Return the stored configuration, or fail if none was ever written.
    pub async fn get(&self, site_id: &SiteId) -> Result<Value, CloudError> {
        self.configs
            .get(site_id)
            .await
            .ok_or(CloudError::ConfigNotFound)
    }

    pub async fn contains(&self, site_id: &SiteId) -> bool {
        self.configs.contains(site_id).await
    }
}
