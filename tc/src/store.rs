//! Core cache trait and in-memory implementation

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::CacheConfig;

/// Logical cache namespaces with distinct default TTLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    /// Destination text -> resolution result documents
    DestinationResolution,
    /// Prompt -> LLM response documents
    LlmResponse,
}

impl CacheCategory {
    /// Default TTL for this category from config
    pub fn default_ttl(&self, config: &CacheConfig) -> Duration {
        match self {
            CacheCategory::DestinationResolution => Duration::from_secs(config.resolution_ttl_secs),
            CacheCategory::LlmResponse => Duration::from_secs(config.llm_ttl_secs),
        }
    }

    /// Stable name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::DestinationResolution => "destination_resolution",
            CacheCategory::LlmResponse => "llm_response",
        }
    }
}

/// Async key-value cache with per-category TTLs
///
/// `set` with `ttl: None` uses the category default. Implementations are
/// free to drop entries early; callers must treat every `get` miss as "do
/// the work again".
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str, category: CacheCategory) -> Option<Value>;

    /// Returns false if the entry could not be stored
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>, category: CacheCategory) -> bool;
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-memory cache backed by a tokio RwLock
///
/// Expired entries are evicted lazily when read.
pub struct MemoryCache {
    config: CacheConfig,
    entries: RwLock<HashMap<(CacheCategory, String), Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live (possibly expired, not yet evicted) entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str, category: CacheCategory) -> Option<Value> {
        let map_key = (category, key.to_string());

        {
            let entries = self.entries.read().await;
            match entries.get(&map_key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    debug!(key, category = category.as_str(), "cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {
                    debug!(key, category = category.as_str(), "cache entry expired");
                }
                None => return None,
            }
        }

        // Entry was present but expired; evict it
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(&map_key)
            && entry.expires_at <= Instant::now()
        {
            entries.remove(&map_key);
        }
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>, category: CacheCategory) -> bool {
        let ttl = ttl.unwrap_or_else(|| category.default_ttl(&self.config));
        debug!(key, category = category.as_str(), ttl_secs = ttl.as_secs(), "cache set");

        let mut entries = self.entries.write().await;
        entries.insert(
            (category, key.to_string()),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        true
    }
}
