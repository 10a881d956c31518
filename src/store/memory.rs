use crate::core::cache::{CacheEntry, EntryStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process entry store backed by a `HashMap`.
pub struct MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V> Default for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> EntryStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        let entries = self.inner.lock().await;
        entries.get(key).cloned()
    }

    async fn insert(&self, key: String, entry: CacheEntry<V>) {
        let mut entries = self.inner.lock().await;
        entries.insert(key, entry);
    }

    async fn remove(&self, key: &str) -> bool {
        let mut entries = self.inner.lock().await;
        entries.remove(key).is_some()
    }

    async fn clear(&self) {
        let mut entries = self.inner.lock().await;
        entries.clear();
    }

    async fn keys(&self) -> Vec<String> {
        let entries = self.inner.lock().await;
        entries.keys().cloned().collect()
    }

    async fn retain(
        &self,
        keep: &(dyn for<'e> Fn(&'e CacheEntry<V>) -> bool + Send + Sync),
    ) -> usize {
        let mut entries = self.inner.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| keep(entry));
        before - entries.len()
    }
}
