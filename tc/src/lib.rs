//! TravelCache - async TTL key-value cache for the trip-planning core
//!
//! Callers cache JSON documents under a (category, key) pair. Each category
//! carries its own default TTL so destination resolutions can live for days
//! while LLM responses expire within the hour. Entries are expired lazily on
//! read.
//!
//! # Example
//!
//! ```ignore
//! use travelcache::{CacheCategory, CacheStore, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! cache.set("jfk", serde_json::json!({"code": "JFK"}), None, CacheCategory::DestinationResolution).await;
//! let hit = cache.get("jfk", CacheCategory::DestinationResolution).await;
//! ```

pub mod config;
mod store;

pub use config::CacheConfig;
pub use store::{CacheCategory, CacheStore, MemoryCache};

/// Default TTL for destination resolutions (7 days)
pub const DEFAULT_RESOLUTION_TTL_SECS: u64 = 7 * 24 * 3600;

/// Default TTL for cached LLM responses (30 minutes)
pub const DEFAULT_LLM_TTL_SECS: u64 = 30 * 60;
