//! Trip context orchestration
//!
//! Combines rule-based and LLM extraction, feeds results through the
//! conflict engine, and reports what is still missing before a trip can
//! be searched or booked.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::{Conflict, ContextUpdate, ResolutionStrategy, TripContext};
use crate::llm::{CompletionRequest, LlmClient, extract_json};
use crate::resolver::{DestinationResolver, ResolveContext, data::primary_airport_for_city};

mod ai;
mod entities;
pub mod rules;

pub use entities::{DestinationEntity, DestinationRole, TravelEntities};

const CONFLICT_MAX_TOKENS: u32 = 512;
const MAX_CLARIFYING_QUESTIONS: usize = 3;

const CONFLICT_SYSTEM_PROMPT: &str = "You resolve contradictions in a travel plan. \
Given a list of conflicts, each with a field path, the existing value and the new value, \
choose the value most likely intended by the traveler. \
Respond with a single JSON object and nothing else:\n\
{\"resolved\": true, \"resolution\": {\"resolutions\": {\"<field>\": <chosen value>}}}";

/// What still blocks acting on a trip context
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_complete: bool,
    /// Fields that must be filled before searching
    pub missing_fields: Vec<String>,
    /// Questions worth asking, including for optional gaps
    pub suggestions: Vec<String>,
    pub warnings: Vec<String>,
    pub confidence: f64,
}

/// Service facade over extraction, merging and validation
pub struct TripContextService {
    resolver: Arc<DestinationResolver>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl TripContextService {
    pub fn new(resolver: Arc<DestinationResolver>, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { resolver, llm }
    }

    /// Extract travel entities from one user message
    ///
    /// Rule extraction always runs; the model supplements it and wins per
    /// field where both produced a value. Place mentions only become
    /// entities once the resolver confirms them. The accumulated context,
    /// when given, biases interpretation: geocoding leans toward the known
    /// departure country, and a lone date on top of a known start reads as
    /// the return date.
    pub async fn extract_travel_entities(&self, message: &str, existing: Option<&TripContext>) -> TravelEntities {
        debug!(message, "extract_travel_entities: called");
        let today = Utc::now().date_naive();

        let mentions = rules::extract_places(message);
        let (rule_start, rule_end) = rules::extract_dates(message, today);
        let rule_travelers = rules::extract_travelers(message);
        let rule_budget = rules::extract_budget(message);
        let rule_duration = rules::extract_duration_days(message);
        let mut preferences = rules::extract_preferences(message);

        let model = match &self.llm {
            Some(llm) => ai::extract(llm.as_ref(), message, today).await.unwrap_or_default(),
            None => ai::AiExtraction::default(),
        };

        let mut start_date = model.start_date.or(rule_start);
        let mut end_date = model.end_date.or(rule_end);
        if end_date.is_none()
            && let Some(candidate) = &start_date
            && let Some(ctx) = existing
            && ctx.end_date.is_none()
            && let Some(known_start) = &ctx.start_date
            && known_start != candidate
            && candidate.as_str() > known_start.as_str()
        {
            debug!(date = %candidate, "extract_travel_entities: lone date reclassified as end date");
            end_date = start_date.take();
        }
        let travelers = model.travelers.or(rule_travelers);
        let budget = model.budget.or(rule_budget);
        let duration_days = model.duration_days.or(rule_duration);
        for tag in model.preferences {
            if !preferences.contains(&tag) {
                preferences.push(tag);
            }
        }

        let mut destinations: Vec<DestinationEntity> = Vec::new();
        let mut departure_city = model.departure_city;

        for phrase in &mentions.departures {
            let resolution = self.resolver.resolve_destination(phrase, true, None).await;
            if resolution.resolved {
                if departure_city.is_none() {
                    departure_city = resolution.city_name.clone();
                }
                destinations.push(DestinationEntity {
                    text: phrase.clone(),
                    role: DestinationRole::Departure,
                    resolution,
                });
            } else {
                debug!(phrase, "extract_travel_entities: unresolved departure mention");
            }
        }

        // Known departure biases geocoding of later mentions
        let bias = departure_city
            .as_deref()
            .or_else(|| existing.and_then(|ctx| ctx.departure_city.as_deref()))
            .and_then(primary_airport_for_city)
            .map(|airport| ResolveContext {
                departure_country: Some(airport.country.to_string()),
            });

        let mut mention_texts = mentions.destinations;
        for text in model.destinations {
            if !mention_texts.iter().any(|m| m.eq_ignore_ascii_case(&text)) {
                mention_texts.push(text);
            }
        }
        for phrase in &mention_texts {
            let resolution = self.resolver.resolve_destination(phrase, false, bias.as_ref()).await;
            if !resolution.resolved {
                debug!(phrase, "extract_travel_entities: unresolved destination mention");
                continue;
            }
            let duplicate = destinations.iter().any(|d| {
                d.role == DestinationRole::Destination
                    && d.resolution.airport_code.is_some()
                    && d.resolution.airport_code == resolution.airport_code
            });
            if !duplicate {
                destinations.push(DestinationEntity {
                    text: phrase.clone(),
                    role: DestinationRole::Destination,
                    resolution,
                });
            }
        }

        let has_destination = destinations.iter().any(|d| d.role == DestinationRole::Destination);
        let trip_type = rules::classify_trip_type(message, has_destination, start_date.is_some());

        TravelEntities {
            destinations,
            departure_city,
            start_date,
            end_date,
            travelers,
            budget,
            duration_days,
            preferences,
            trip_type: Some(trip_type),
            trip_purpose: model.trip_purpose,
        }
    }

    /// Fold one update into the context, newest data winning conflicts
    pub fn merge_context(&self, context: &mut TripContext, update: &ContextUpdate) {
        let conflicts = context.detect_conflicts(update);
        if !conflicts.is_empty() {
            debug!(count = conflicts.len(), "merge_context: resolving conflicts most_recent");
            context.resolve_conflicts(&conflicts, ResolutionStrategy::MostRecent);
        }
        context.apply_update(update);
    }

    /// Settle conflicts by asking the model, falling back to most-recent
    pub async fn resolve_conflicts_with_ai(&self, context: &mut TripContext, conflicts: &[Conflict]) {
        if conflicts.is_empty() {
            return;
        }
        let Some(llm) = &self.llm else {
            context.resolve_conflicts(conflicts, ResolutionStrategy::MostRecent);
            return;
        };

        let Ok(payload) = serde_json::to_string_pretty(conflicts) else {
            context.resolve_conflicts(conflicts, ResolutionStrategy::MostRecent);
            return;
        };
        let snapshot = serde_json::to_string(context).unwrap_or_default();
        let request = CompletionRequest::structured(
            CONFLICT_SYSTEM_PROMPT,
            format!("Current trip context:\n{snapshot}\n\nConflicts:\n{payload}"),
            CONFLICT_MAX_TOKENS,
        );

        let resolutions = match llm.generate(request).await {
            Ok(text) => extract_json(&text)
                .filter(|v| v.get("resolved").and_then(Value::as_bool).unwrap_or(false))
                .and_then(|v| {
                    v.pointer("/resolution/resolutions").and_then(Value::as_object).cloned()
                }),
            Err(error) => {
                warn!(%error, "resolve_conflicts_with_ai: model call failed");
                None
            }
        };

        match resolutions {
            Some(map) => context.apply_resolutions(conflicts, &map),
            None => context.resolve_conflicts(conflicts, ResolutionStrategy::MostRecent),
        }
    }

    /// Check whether a context is actionable and what is missing
    pub fn validate_trip_context(&self, context: &TripContext) -> ValidationReport {
        let mut missing = Vec::new();
        let mut suggestions = Vec::new();
        let mut warnings = Vec::new();
        let mut confidence = context.confidence;

        let start = context.start_date.as_deref().and_then(parse_iso);
        let end = context.end_date.as_deref().and_then(parse_iso);
        if let (Some(start), Some(end)) = (start, end)
            && end < start
        {
            warnings.push(format!(
                "End date {} is before start date {}",
                context.end_date.as_deref().unwrap_or_default(),
                context.start_date.as_deref().unwrap_or_default()
            ));
            confidence *= 0.5;
        }
        if let Some(start) = start
            && start < Utc::now().date_naive()
        {
            warnings.push(format!(
                "Start date {} is in the past",
                context.start_date.as_deref().unwrap_or_default()
            ));
            confidence *= 0.8;
        }

        if context.destinations.is_empty() && context.destination_city.is_none() {
            missing.push("destination".to_string());
            suggestions.push("Where would you like to travel?".to_string());
        }
        if context.departure_city.is_none() && context.trip_type.as_deref() == Some("flight_search") {
            missing.push("departure_city".to_string());
            suggestions.push("Where will you be departing from?".to_string());
        }
        if context.start_date.is_none() {
            missing.push("start_date".to_string());
            suggestions.push("When would you like to depart?".to_string());
        }

        // optional gaps prompt a question but do not block completeness
        if context.travelers.is_none() {
            suggestions.push("How many people are traveling?".to_string());
        }
        if context.destinations.len() > 1 && context.city_durations.is_empty() {
            suggestions.push("How long would you like to stay in each city?".to_string());
        }

        let confidence = (confidence - 0.2 * missing.len() as f64).max(0.1);

        ValidationReport {
            is_complete: missing.is_empty(),
            missing_fields: missing,
            suggestions,
            warnings,
            confidence,
        }
    }

    /// Up to three questions to move the conversation forward
    pub fn generate_clarifying_questions(&self, context: &TripContext) -> Vec<String> {
        let report = self.validate_trip_context(context);
        let mut questions = report.suggestions;

        if context.budget.is_none() {
            questions.push("What's your budget for this trip?".to_string());
        }
        match context.trip_type.as_deref() {
            Some("hotel_search") if context.preferences.is_empty() => {
                questions.push("What kind of hotel are you looking for?".to_string());
            }
            Some("activity_search") if context.preferences.is_empty() => {
                questions.push("What kinds of activities interest you?".to_string());
            }
            Some("general_planning") if context.trip_purpose.is_none() => {
                questions.push("What's the occasion for the trip?".to_string());
            }
            _ => {}
        }
        if context.preferences.is_empty() {
            questions.push("Any preferences I should keep in mind, like budget level or travel style?".to_string());
        }

        let mut deduped: Vec<String> = Vec::new();
        for question in questions {
            if !deduped.contains(&question) {
                deduped.push(question);
            }
        }
        deduped.truncate(MAX_CLARIFYING_QUESTIONS);
        deduped
    }
}

fn parse_iso(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::context::{Budget, Travelers};

    fn service() -> TripContextService {
        let resolver = Arc::new(DestinationResolver::new(ResolverConfig::default()));
        TripContextService::new(resolver, None)
    }

    #[tokio::test]
    async fn test_extract_travelers_and_destination() {
        let entities = service()
            .extract_travel_entities("2 adults going to Paris next week", None)
            .await;

        assert_eq!(
            entities.travelers,
            Some(Travelers { adults: 2, children: 0, infants: 0 })
        );
        assert!(entities.start_date.is_some());

        let destination = entities
            .destinations
            .iter()
            .find(|d| d.role == DestinationRole::Destination)
            .unwrap();
        assert_eq!(destination.text, "Paris");
        assert_eq!(destination.resolution.city_code.as_deref(), Some("PAR"));
    }

    #[tokio::test]
    async fn test_extract_departure_and_destination_roles() {
        let entities = service()
            .extract_travel_entities("Flights from New York to Tokyo in June", None)
            .await;

        let departure = entities
            .destinations
            .iter()
            .find(|d| d.role == DestinationRole::Departure)
            .unwrap();
        assert_eq!(departure.resolution.city_code.as_deref(), Some("NYC"));
        assert_eq!(entities.departure_city.as_deref(), Some("New York"));

        let destination = entities
            .destinations
            .iter()
            .find(|d| d.role == DestinationRole::Destination)
            .unwrap();
        assert_eq!(destination.resolution.city_code.as_deref(), Some("TYO"));
        assert_eq!(entities.trip_type.as_deref(), Some("flight_search"));
    }

    #[tokio::test]
    async fn test_extract_ignores_unresolvable_mentions() {
        let entities = service().extract_travel_entities("visiting Zzxqyw soon", None).await;
        assert!(entities.destinations.is_empty());
    }

    #[tokio::test]
    async fn test_lone_date_with_known_start_becomes_end() {
        let mut context = TripContext::new();
        context.start_date = Some("2000-01-01".into());

        let entities = service()
            .extract_travel_entities("maybe next week instead", Some(&context))
            .await;

        assert!(entities.start_date.is_none());
        assert!(entities.end_date.is_some());
    }

    #[test]
    fn test_merge_records_conflict_and_applies_new_value() {
        let svc = service();
        let mut context = TripContext::new();
        context.start_date = Some("2024-06-01".into());

        let update = ContextUpdate {
            start_date: Some("2024-07-01".into()),
            ..Default::default()
        };
        svc.merge_context(&mut context, &update);

        assert_eq!(context.start_date.as_deref(), Some("2024-07-01"));
        assert_eq!(context.conflicts_resolved, vec!["date_conflict:start_date".to_string()]);
        assert!(context.confidence < 1.0);
    }

    #[test]
    fn test_validate_empty_context() {
        let report = service().validate_trip_context(&TripContext::new());

        assert!(!report.is_complete);
        assert_eq!(
            report.missing_fields,
            vec!["destination".to_string(), "start_date".to_string()]
        );
        assert!(report.suggestions.contains(&"Where would you like to travel?".to_string()));
        assert!(report.suggestions.contains(&"When would you like to depart?".to_string()));
        assert!((report.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_validate_departure_required_for_flights() {
        let mut context = TripContext::new();
        context.destination_city = Some("Paris".into());
        context.start_date = Some("2030-06-01".into());
        context.trip_type = Some("flight_search".into());

        let report = service().validate_trip_context(&context);
        assert_eq!(report.missing_fields, vec!["departure_city".to_string()]);
        assert!(!report.is_complete);
    }

    #[test]
    fn test_validate_date_warnings_compound() {
        let mut context = TripContext::new();
        context.destination_city = Some("Paris".into());
        context.start_date = Some("2020-06-10".into());
        context.end_date = Some("2020-06-01".into());

        let report = service().validate_trip_context(&context);
        assert!(report.is_complete);
        assert_eq!(report.warnings.len(), 2);
        // 1.0 * 0.5 (inverted range) * 0.8 (past start)
        assert!((report.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_validate_complete_context() {
        let mut context = TripContext::new();
        context.destination_city = Some("Paris".into());
        context.start_date = Some("2030-06-01".into());
        context.end_date = Some("2030-06-10".into());
        context.travelers = Some(Travelers::default());

        let report = service().validate_trip_context(&context);
        assert!(report.is_complete);
        assert!(report.missing_fields.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.confidence, 1.0);
    }

    #[test]
    fn test_clarifying_questions_capped_and_deduped() {
        let questions = service().generate_clarifying_questions(&TripContext::new());

        assert_eq!(questions.len(), MAX_CLARIFYING_QUESTIONS);
        let mut sorted = questions.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), questions.len());
        assert_eq!(questions[0], "Where would you like to travel?");
    }

    #[test]
    fn test_clarifying_questions_nearly_complete_context() {
        let mut context = TripContext::new();
        context.destination_city = Some("Paris".into());
        context.start_date = Some("2030-06-01".into());
        context.travelers = Some(Travelers::default());
        context.budget = Some(Budget::Exact {
            amount: 2000.0,
            currency: "USD".into(),
            per_person: false,
        });
        context.preferences = vec!["luxury".into()];

        let questions = service().generate_clarifying_questions(&context);
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn test_ai_conflict_resolution_without_model_falls_back() {
        let svc = service();
        let mut context = TripContext::new();
        context.start_date = Some("2024-06-01".into());

        let update = ContextUpdate {
            start_date: Some("2024-07-01".into()),
            ..Default::default()
        };
        let conflicts = context.detect_conflicts(&update);
        svc.resolve_conflicts_with_ai(&mut context, &conflicts).await;

        assert_eq!(context.start_date.as_deref(), Some("2024-07-01"));
        assert_eq!(context.conflicts_resolved.len(), 1);
    }
}
