//! Time-to-live cache over a pluggable entry store.

use crate::core::clock::Clock;
use crate::store::memory::MemoryStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp) < self.ttl
    }
}

/// Storage backend for [`TtlCache`]. Stores never interpret expiry themselves.
#[async_trait]
pub trait EntryStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<CacheEntry<V>>;
    async fn insert(&self, key: String, entry: CacheEntry<V>);
    async fn remove(&self, key: &str) -> bool;
    async fn clear(&self);
    async fn keys(&self) -> Vec<String>;
    /// Keeps only entries for which `keep` returns true; returns how many were dropped.
    async fn retain(
        &self,
        keep: &(dyn for<'e> Fn(&'e CacheEntry<V>) -> bool + Send + Sync),
    ) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Builds a cache key from an endpoint name and its parameters.
///
/// Parameters are serialized as JSON with object keys sorted, so equal
/// parameter sets give equal keys regardless of field order.
pub fn cache_key<P: Serialize + ?Sized>(endpoint: &str, params: &P) -> String {
    let params = serde_json::to_value(params)
        .map(|value| canonical_json(&value))
        .unwrap_or_default();
    format!("{endpoint}:{params}")
}

fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, String> =
                map.iter().map(|(k, v)| (k, canonical_json(v))).collect();
            let fields: Vec<String> = sorted
                .into_iter()
                .map(|(k, v)| format!("{}:{v}", Value::String(k.clone())))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}

pub struct TtlCache<V, S = MemoryStore<V>>
where
    V: Clone + Send + Sync + 'static,
    S: EntryStore<V>,
{
    store: S,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
    max_entries: Option<usize>,
    _marker: PhantomData<V>,
}

impl<V> TtlCache<V, MemoryStore<V>>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self::with_store(MemoryStore::new(), clock, default_ttl)
    }
}

impl<V, S> TtlCache<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: EntryStore<V>,
{
    pub fn with_store(store: S, clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self {
            store,
            clock,
            default_ttl,
            max_entries: None,
            _marker: PhantomData,
        }
    }

    /// Bounds the number of stored entries. Unbounded when never called.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub async fn set(&self, key: &str, data: V, ttl: Option<Duration>) {
        if let Some(max) = self.max_entries {
            self.make_room(key, max).await;
        }
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        debug!("Cache PUT for key: {}", key);
        self.store.insert(key.to_string(), entry).await;
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        match self.store.get(key).await {
            Some(entry) if entry.is_valid_at(self.clock.now()) => {
                debug!("Cache HIT for key: {}", key);
                Some(entry.data)
            }
            Some(_) => {
                debug!("Cache entry expired for key: {}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    pub async fn is_valid(&self, key: &str) -> bool {
        self.store
            .get(key)
            .await
            .is_some_and(|entry| entry.is_valid_at(self.clock.now()))
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        debug!("Cache REMOVE for key: {}", key);
        self.store.remove(key).await
    }

    pub async fn clear(&self) {
        debug!("Cache CLEAR");
        self.store.clear().await;
    }

    /// Size and keys, expired-but-unswept entries included.
    pub async fn stats(&self) -> CacheStats {
        let mut keys = self.store.keys().await;
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self
            .store
            .retain(&move |entry: &CacheEntry<V>| entry.is_valid_at(now))
            .await;
        if removed > 0 {
            debug!("Cache SWEEP removed {} expired entries", removed);
        }
        removed
    }

    async fn make_room(&self, incoming: &str, max: usize) {
        let keys = self.store.keys().await;
        if keys.len() < max || keys.iter().any(|k| k == incoming) {
            return;
        }
        let swept = self.sweep_expired().await;
        if keys.len() - swept < max {
            return;
        }

        let mut oldest: Option<(String, DateTime<Utc>)> = None;
        for key in self.store.keys().await {
            if let Some(entry) = self.store.get(&key).await {
                if oldest.as_ref().is_none_or(|(_, ts)| entry.timestamp < *ts) {
                    oldest = Some((key, entry.timestamp));
                }
            }
        }
        if let Some((key, _)) = oldest {
            debug!("Cache EVICT oldest key: {}", key);
            self.store.remove(&key).await;
        }
    }
}
