//! LLM client module for TripPlanner
//!
//! Provides the completion port the resolver and context service use for
//! destination interpretation, entity extraction, and conflict resolution.
//! The LLM is always advisory: every caller has a non-LLM fallback path.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
mod client;
mod error;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use types::{CompletionRequest, Message, Role};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicClient::from_config(config)?)),
        other => Err(LlmError::InvalidResponse(format!(
            "Unknown LLM provider: '{}'. Supported: anthropic",
            other
        ))),
    }
}

/// Extract a JSON object from an LLM reply
///
/// Models frequently wrap JSON in markdown code fences or surround it with
/// prose. Tries the raw text first, then a fence-stripped version, then the
/// outermost `{...}` span. Returns None when nothing parses.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    // Strip ```json ... ``` fences
    if let Some(stripped) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        && let Ok(value) = serde_json::from_str(stripped.trim())
    {
        return Some(value);
    }

    // Outermost object span
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end > start {
        serde_json::from_str(&trimmed[start..=end]).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_raw() {
        let value = extract_json(r#"{"city_name": "Paris"}"#).unwrap();
        assert_eq!(value, json!({"city_name": "Paris"}));
    }

    #[test]
    fn test_extract_json_fenced() {
        let text = "```json\n{\"city_name\": \"Nice\"}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["city_name"], "Nice");
    }

    #[test]
    fn test_extract_json_with_prose() {
        let text = "Here is the result:\n{\"airport_code\": \"CDG\"}\nHope that helps!";
        let value = extract_json(text).unwrap();
        assert_eq!(value["airport_code"], "CDG");
    }

    #[test]
    fn test_extract_json_garbage() {
        assert!(extract_json("sorry, I can't do that").is_none());
        assert!(extract_json("").is_none());
    }
}
