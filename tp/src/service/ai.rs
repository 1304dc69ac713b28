//! LLM-assisted entity extraction
//!
//! Supplements the rule extractors for phrasing they cannot parse. Any
//! model failure degrades to "nothing extracted"; the rules result alone
//! is always a valid outcome.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::context::{Budget, Travelers};
use crate::llm::{CompletionRequest, LlmClient, extract_json};

const EXTRACTION_MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You extract structured travel entities from user messages. \
Respond with a single JSON object and nothing else, using exactly these keys \
(omit keys the message says nothing about):\n\
{\n\
  \"destinations\": [\"place name\"],\n\
  \"departure_city\": \"city\",\n\
  \"start_date\": \"YYYY-MM-DD\",\n\
  \"end_date\": \"YYYY-MM-DD\",\n\
  \"travelers\": {\"adults\": 1, \"children\": 0, \"infants\": 0},\n\
  \"budget\": {\"type\": \"exact|maximum|approximate\", \"amount\": 0, \"currency\": \"USD\", \"per_person\": false},\n\
  \"duration_days\": 0,\n\
  \"preferences\": [\"tag\"],\n\
  \"trip_purpose\": \"short phrase\"\n\
}\n\
Dates must be ISO and resolved relative to the given current date. \
Do not invent values the message does not state.";

/// What the model pulled out of one message
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AiExtraction {
    pub destinations: Vec<String>,
    pub departure_city: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub travelers: Option<Travelers>,
    pub budget: Option<Budget>,
    pub duration_days: Option<u32>,
    pub preferences: Vec<String>,
    pub trip_purpose: Option<String>,
}

/// Ask the model for entities; None on any failure
pub async fn extract(llm: &dyn LlmClient, message: &str, today: NaiveDate) -> Option<AiExtraction> {
    let user = format!("Current date: {}\n\nMessage: {message}", today.format("%Y-%m-%d"));
    let request = CompletionRequest::structured(SYSTEM_PROMPT, user, EXTRACTION_MAX_TOKENS);

    let response = match llm.generate(request).await {
        Ok(text) => text,
        Err(error) => {
            debug!(%error, "ai extraction: model call failed");
            return None;
        }
    };

    let value = extract_json(&response)?;
    match serde_json::from_value::<AiExtraction>(value) {
        Ok(extraction) => Some(extraction),
        Err(error) => {
            debug!(%error, "ai extraction: malformed entity payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extraction_deserializes_partial_payload() {
        let value = json!({
            "destinations": ["Kyoto"],
            "start_date": "2024-10-01",
            "travelers": {"adults": 2}
        });
        let extraction: AiExtraction = serde_json::from_value(value).unwrap();
        assert_eq!(extraction.destinations, vec!["Kyoto".to_string()]);
        assert_eq!(extraction.start_date.as_deref(), Some("2024-10-01"));
        assert_eq!(
            extraction.travelers,
            Some(Travelers { adults: 2, children: 0, infants: 0 })
        );
        assert!(extraction.budget.is_none());
    }

    #[test]
    fn test_extraction_rejects_wrong_shape() {
        let value = json!({"destinations": "Kyoto"});
        assert!(serde_json::from_value::<AiExtraction>(value).is_err());
    }
}
