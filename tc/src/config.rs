//! Configuration for travelcache

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL in seconds for destination-resolution entries
    #[serde(default = "default_resolution_ttl", rename = "resolution-ttl-secs")]
    pub resolution_ttl_secs: u64,

    /// TTL in seconds for LLM-response entries
    #[serde(default = "default_llm_ttl", rename = "llm-ttl-secs")]
    pub llm_ttl_secs: u64,
}

fn default_resolution_ttl() -> u64 {
    crate::DEFAULT_RESOLUTION_TTL_SECS
}

fn default_llm_ttl() -> u64 {
    crate::DEFAULT_LLM_TTL_SECS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            resolution_ttl_secs: default_resolution_ttl(),
            llm_ttl_secs: default_llm_ttl(),
        }
    }
}

impl CacheConfig {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: CacheConfig = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("travelcache").join("config.yml")),
            Some(PathBuf::from("travelcache.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: CacheConfig = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.resolution_ttl_secs, crate::DEFAULT_RESOLUTION_TTL_SECS);
        assert_eq!(config.llm_ttl_secs, crate::DEFAULT_LLM_TTL_SECS);
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("cache.yml");
        std::fs::write(&path, "resolution-ttl-secs: 60\n").unwrap();

        let config = CacheConfig::load(Some(&path)).unwrap();
        assert_eq!(config.resolution_ttl_secs, 60);
        // Unspecified field falls back to default
        assert_eq!(config.llm_ttl_secs, crate::DEFAULT_LLM_TTL_SECS);
    }
}
