//! TripContext: accumulated trip state and the conflict engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{Conflict, ConflictType, ResolutionStrategy, Severity};
use crate::resolver::Resolution;

/// Traveler counts by age bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Travelers {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for Travelers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

impl Travelers {
    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }
}

/// Trip budget, typed by how the user phrased it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Budget {
    Exact { amount: f64, currency: String, per_person: bool },
    Maximum { amount: f64, currency: String, per_person: bool },
    Approximate { amount: f64, currency: String, per_person: bool },
    Range { min_amount: f64, max_amount: f64, currency: String },
}

impl Budget {
    /// Representative amount used for numeric conflict comparison
    pub fn amount(&self) -> f64 {
        match self {
            Budget::Exact { amount, .. } | Budget::Maximum { amount, .. } | Budget::Approximate { amount, .. } => *amount,
            Budget::Range { max_amount, .. } => *max_amount,
        }
    }

    pub fn currency(&self) -> &str {
        match self {
            Budget::Exact { currency, .. }
            | Budget::Maximum { currency, .. }
            | Budget::Approximate { currency, .. }
            | Budget::Range { currency, .. } => currency,
        }
    }

    fn set_amount(&mut self, value: f64) {
        match self {
            Budget::Exact { amount, .. } | Budget::Maximum { amount, .. } | Budget::Approximate { amount, .. } => {
                *amount = value
            }
            Budget::Range { max_amount, .. } => *max_amount = value,
        }
    }
}

/// Incoming field values one update attempt carries
///
/// Everything is optional; absent fields are simply not considered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextUpdate {
    pub departure_city: Option<String>,
    pub destination_city: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub travelers: Option<Travelers>,
    pub budget: Option<Budget>,
    pub duration_days: Option<u32>,
    pub destinations: Vec<Resolution>,
    pub preferences: Vec<String>,
    pub city_durations: HashMap<String, u32>,
    pub trip_type: Option<String>,
    pub trip_purpose: Option<String>,
}

/// Mutable accumulator of trip-planning state for one session
///
/// Mutated exclusively through detect_conflicts -> resolve_conflicts ->
/// apply_update passes driven by each new user message. Owned 1:1 by a
/// session; storage and eviction belong to the session repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripContext {
    pub departure_city: Option<String>,
    pub destination_city: Option<String>,
    /// Destination resolutions in mention order
    pub destinations: Vec<Resolution>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// None until the user states a count
    pub travelers: Option<Travelers>,
    pub city_durations: HashMap<String, u32>,
    pub budget: Option<Budget>,
    pub duration_days: Option<u32>,
    pub preferences: Vec<String>,
    pub trip_type: Option<String>,
    pub trip_purpose: Option<String>,
    /// Unresolved conflicts from the latest update passes
    pub conflicts: Vec<Conflict>,
    /// Identifiers of conflicts already applied, no duplicates
    pub conflicts_resolved: Vec<String>,
    /// Trustworthiness of the accumulated state, in [0.1, 1.0]
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Default for TripContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TripContext {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            departure_city: None,
            destination_city: None,
            destinations: Vec::new(),
            start_date: None,
            end_date: None,
            travelers: None,
            city_durations: HashMap::new(),
            budget: None,
            duration_days: None,
            preferences: Vec::new(),
            trip_type: None,
            trip_purpose: None,
            conflicts: Vec::new(),
            conflicts_resolved: Vec::new(),
            confidence: 1.0,
            created_at: now,
            last_updated: now,
        }
    }

    /// Compare incoming data against accumulated state
    ///
    /// A field whose existing value is absent never conflicts - new data
    /// fills the gap. Destination comparison is case-insensitive; traveler
    /// and budget comparisons are numeric.
    pub fn detect_conflicts(&self, update: &ContextUpdate) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        if let (Some(existing), Some(new)) = (&self.start_date, &update.start_date)
            && existing != new
        {
            conflicts.push(Conflict::new(
                ConflictType::DateConflict,
                "start_date",
                json!(existing),
                json!(new),
                Severity::High,
            ));
        }

        if let (Some(existing), Some(new)) = (&self.end_date, &update.end_date)
            && existing != new
        {
            conflicts.push(Conflict::new(
                ConflictType::DateConflict,
                "end_date",
                json!(existing),
                json!(new),
                Severity::High,
            ));
        }

        if let (Some(existing), Some(new)) = (&self.destination_city, &update.destination_city)
            && !existing.eq_ignore_ascii_case(new)
        {
            conflicts.push(Conflict::new(
                ConflictType::DestinationConflict,
                "destination_city",
                json!(existing),
                json!(new),
                Severity::High,
            ));
        }

        if let (Some(existing), Some(new)) = (&self.travelers, &update.travelers) {
            for (field, old, newer) in [
                ("travelers.adults", existing.adults, new.adults),
                ("travelers.children", existing.children, new.children),
                ("travelers.infants", existing.infants, new.infants),
            ] {
                if old != newer {
                    conflicts.push(Conflict::new(
                        ConflictType::TravelerConflict,
                        field,
                        json!(old),
                        json!(newer),
                        Severity::Medium,
                    ));
                }
            }
        }

        if let (Some(existing), Some(new)) = (&self.budget, &update.budget)
            && existing.amount() != new.amount()
        {
            conflicts.push(Conflict::new(
                ConflictType::BudgetConflict,
                "budget.amount",
                json!(existing.amount()),
                json!(new.amount()),
                Severity::Medium,
            ));
        }

        debug!(count = conflicts.len(), "detect_conflicts: done");
        conflicts
    }

    /// Settle detected conflicts under the given strategy
    ///
    /// Applied conflicts are recorded in `conflicts_resolved`; rejected ones
    /// stay in `conflicts`. Confidence drops by 0.1 per conflict presented
    /// (floored at 0.5) regardless of how many actually resolved -
    /// repeatedly unresolved conflicts keep eroding it on every pass.
    pub fn resolve_conflicts(&mut self, conflicts: &[Conflict], strategy: ResolutionStrategy) {
        if conflicts.is_empty() {
            return;
        }
        debug!(count = conflicts.len(), ?strategy, "resolve_conflicts: called");

        for conflict in conflicts {
            let applied = match strategy {
                // AiResolution is driven by the async service layer; reaching
                // this synchronous path means its fallback semantics apply
                ResolutionStrategy::MostRecent | ResolutionStrategy::AiResolution => {
                    self.apply_field(&conflict.field, &conflict.new);
                    true
                }
                ResolutionStrategy::MostSpecific => {
                    if Self::is_more_specific(&conflict.new, &conflict.existing) {
                        self.apply_field(&conflict.field, &conflict.new);
                        true
                    } else {
                        false
                    }
                }
                ResolutionStrategy::Merge => match conflict.field.as_str() {
                    "preferences" => {
                        if let Some(items) = conflict.new.as_array() {
                            for item in items.iter().filter_map(Value::as_str) {
                                if !self.preferences.iter().any(|p| p == item) {
                                    self.preferences.push(item.to_string());
                                }
                            }
                        }
                        true
                    }
                    "destinations" => {
                        if let Ok(resolutions) = serde_json::from_value::<Vec<Resolution>>(conflict.new.clone()) {
                            for resolution in resolutions {
                                self.push_destination(resolution);
                            }
                        }
                        true
                    }
                    _ => false,
                },
            };

            if applied {
                self.mark_resolved(&conflict.id());
            } else {
                self.record_unresolved(conflict.clone());
            }
        }

        self.finish_conflict_pass(conflicts.len());
    }

    /// Apply externally decided values for a batch of conflicts
    ///
    /// `resolutions` maps field paths to chosen values; conflicts without
    /// an entry fall back to their incoming value. Used by the AI
    /// resolution path in the service layer.
    pub fn apply_resolutions(&mut self, conflicts: &[Conflict], resolutions: &serde_json::Map<String, Value>) {
        if conflicts.is_empty() {
            return;
        }
        for conflict in conflicts {
            let value = resolutions.get(&conflict.field).unwrap_or(&conflict.new);
            self.apply_field(&conflict.field, value);
            self.mark_resolved(&conflict.id());
        }
        self.finish_conflict_pass(conflicts.len());
    }

    fn finish_conflict_pass(&mut self, presented: usize) {
        self.confidence = clamp_confidence((self.confidence - 0.1 * presented as f64).max(0.5));
        self.last_updated = Utc::now();
    }

    /// Apply update fields directly (the no-conflict path)
    ///
    /// Scalars overwrite when present, list fields union-append.
    pub fn apply_update(&mut self, update: &ContextUpdate) {
        if let Some(v) = &update.departure_city {
            self.departure_city = Some(v.clone());
        }
        if let Some(v) = &update.destination_city {
            self.destination_city = Some(v.clone());
        }
        if let Some(v) = &update.start_date {
            self.start_date = Some(v.clone());
        }
        if let Some(v) = &update.end_date {
            self.end_date = Some(v.clone());
        }
        if let Some(v) = update.travelers {
            self.travelers = Some(v);
        }
        if let Some(v) = &update.budget {
            self.budget = Some(v.clone());
        }
        if let Some(v) = update.duration_days {
            self.duration_days = Some(v);
        }
        if let Some(v) = &update.trip_type {
            self.trip_type = Some(v.clone());
        }
        if let Some(v) = &update.trip_purpose {
            self.trip_purpose = Some(v.clone());
        }
        for resolution in &update.destinations {
            self.push_destination(resolution.clone());
        }
        for preference in &update.preferences {
            if !self.preferences.iter().any(|p| p == preference) {
                self.preferences.push(preference.clone());
            }
        }
        for (city, days) in &update.city_durations {
            self.city_durations.insert(city.clone(), *days);
        }
        self.last_updated = Utc::now();
    }

    /// Append a destination unless an equivalent entry exists
    pub fn push_destination(&mut self, resolution: Resolution) {
        let duplicate = self.destinations.iter().any(|d| {
            match (&d.airport_code, &resolution.airport_code) {
                (Some(a), Some(b)) => a == b,
                _ => {
                    d.city_name.as_deref().map(str::to_lowercase)
                        == resolution.city_name.as_deref().map(str::to_lowercase)
                }
            }
        });
        if !duplicate {
            self.destinations.push(resolution);
        }
    }

    fn mark_resolved(&mut self, id: &str) {
        self.conflicts.retain(|c| c.id() != id);
        if !self.conflicts_resolved.iter().any(|r| r == id) {
            self.conflicts_resolved.push(id.to_string());
        }
    }

    fn record_unresolved(&mut self, conflict: Conflict) {
        let id = conflict.id();
        self.conflicts.retain(|c| c.id() != id);
        self.conflicts.push(conflict);
    }

    /// Write a resolved value back by its dotted field path
    pub fn apply_field(&mut self, field: &str, value: &Value) {
        match field {
            "start_date" => self.start_date = value.as_str().map(str::to_string),
            "end_date" => self.end_date = value.as_str().map(str::to_string),
            "destination_city" => self.destination_city = value.as_str().map(str::to_string),
            "departure_city" => self.departure_city = value.as_str().map(str::to_string),
            "trip_type" => self.trip_type = value.as_str().map(str::to_string),
            "trip_purpose" => self.trip_purpose = value.as_str().map(str::to_string),
            "duration_days" => self.duration_days = value.as_u64().map(|v| v as u32),
            "travelers.adults" => {
                if let Some(v) = value.as_u64() {
                    self.travelers.get_or_insert_with(Travelers::default).adults = v as u32;
                }
            }
            "travelers.children" => {
                if let Some(v) = value.as_u64() {
                    self.travelers.get_or_insert_with(Travelers::default).children = v as u32;
                }
            }
            "travelers.infants" => {
                if let Some(v) = value.as_u64() {
                    self.travelers.get_or_insert_with(Travelers::default).infants = v as u32;
                }
            }
            "budget" | "budget.amount" => {
                if let Some(amount) = value.as_f64() {
                    match &mut self.budget {
                        Some(budget) => budget.set_amount(amount),
                        None => {
                            self.budget = Some(Budget::Exact {
                                amount,
                                currency: "USD".to_string(),
                                per_person: false,
                            })
                        }
                    }
                } else if let Ok(budget) = serde_json::from_value::<Budget>(value.clone()) {
                    self.budget = Some(budget);
                }
            }
            other => warn!(field = other, "apply_field: unknown field path"),
        }
    }

    /// Specificity heuristic for MostSpecific resolution
    ///
    /// Dates win by component count, numbers by magnitude, strings by length.
    fn is_more_specific(new: &Value, existing: &Value) -> bool {
        if let (Some(new_n), Some(old_n)) = (new.as_f64(), existing.as_f64()) {
            return new_n > old_n;
        }
        if let (Some(new_s), Some(old_s)) = (new.as_str(), existing.as_str()) {
            let new_dashes = new_s.matches('-').count();
            let old_dashes = old_s.matches('-').count();
            if new_dashes != old_dashes && (new_dashes > 0 || old_dashes > 0) {
                return new_dashes > old_dashes;
            }
            return new_s.len() > old_s.len();
        }
        false
    }
}

fn clamp_confidence(value: f64) -> f64 {
    value.clamp(0.1, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_with_start(date: &str) -> ContextUpdate {
        ContextUpdate {
            start_date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_conflict_when_existing_absent() {
        let ctx = TripContext::new();
        let update = ContextUpdate {
            start_date: Some("2024-06-01".into()),
            destination_city: Some("Paris".into()),
            travelers: Some(Travelers {
                adults: 2,
                children: 0,
                infants: 0,
            }),
            ..Default::default()
        };

        assert!(ctx.detect_conflicts(&update).is_empty());
    }

    #[test]
    fn test_no_conflict_when_values_equal() {
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-01".into());
        ctx.destination_city = Some("Paris".into());

        let update = ContextUpdate {
            start_date: Some("2024-06-01".into()),
            destination_city: Some("PARIS".into()), // case-insensitive
            ..Default::default()
        };

        assert!(ctx.detect_conflicts(&update).is_empty());
    }

    #[test]
    fn test_date_conflict_detected() {
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-01".into());

        let conflicts = ctx.detect_conflicts(&update_with_start("2024-07-01"));

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::DateConflict);
        assert_eq!(conflicts[0].field, "start_date");
    }

    #[test]
    fn test_most_recent_applies_and_records() {
        // Scenario: existing start 2024-06-01, new 2024-07-01, MOST_RECENT
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-01".into());

        let conflicts = ctx.detect_conflicts(&update_with_start("2024-07-01"));
        ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostRecent);

        assert_eq!(ctx.start_date.as_deref(), Some("2024-07-01"));
        assert_eq!(ctx.conflicts_resolved.len(), 1);
        assert!(ctx.conflicts.is_empty());
    }

    #[test]
    fn test_most_recent_resolves_every_conflict() {
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-01".into());
        ctx.destination_city = Some("Rome".into());
        ctx.travelers = Some(Travelers::default());

        let update = ContextUpdate {
            start_date: Some("2024-07-01".into()),
            destination_city: Some("Paris".into()),
            travelers: Some(Travelers {
                adults: 3,
                children: 0,
                infants: 0,
            }),
            ..Default::default()
        };

        let conflicts = ctx.detect_conflicts(&update);
        let presented = conflicts.len();
        ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostRecent);

        assert_eq!(ctx.conflicts_resolved.len(), presented);
        assert_eq!(ctx.destination_city.as_deref(), Some("Paris"));
        assert_eq!(ctx.travelers.unwrap().adults, 3);
    }

    #[test]
    fn test_most_specific_accepts_fuller_date() {
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06".into());

        let conflicts = ctx.detect_conflicts(&update_with_start("2024-06-15"));
        ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostSpecific);

        assert_eq!(ctx.start_date.as_deref(), Some("2024-06-15"));
        assert_eq!(ctx.conflicts_resolved.len(), 1);
    }

    #[test]
    fn test_most_specific_rejects_vaguer_value() {
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-15".into());

        let conflicts = ctx.detect_conflicts(&update_with_start("2024-06"));
        ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostSpecific);

        // Existing value stands and nothing is marked resolved
        assert_eq!(ctx.start_date.as_deref(), Some("2024-06-15"));
        assert!(ctx.conflicts_resolved.is_empty());
        assert_eq!(ctx.conflicts.len(), 1);
    }

    #[test]
    fn test_most_specific_rejection_still_decays_confidence() {
        // Penalty counts conflicts presented, not conflicts resolved
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-15".into());

        let conflicts = ctx.detect_conflicts(&update_with_start("2024-06"));
        ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostSpecific);
        assert!((ctx.confidence - 0.9).abs() < 1e-9);

        // Same rejected conflict presented again keeps eroding confidence
        let conflicts = ctx.detect_conflicts(&update_with_start("2024-06"));
        ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostSpecific);
        assert!((ctx.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_floor() {
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-01".into());

        // Ten passes of one conflict each can at most reach the 0.5 floor
        for i in 0..10 {
            let date = format!("2024-07-{:02}", i + 1);
            let conflicts = ctx.detect_conflicts(&update_with_start(&date));
            ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostRecent);
        }

        assert!(ctx.confidence >= 0.5);
        assert!(ctx.confidence <= 1.0);
    }

    #[test]
    fn test_conflicts_resolved_never_duplicates() {
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-01".into());

        for date in ["2024-07-01", "2024-08-01"] {
            let conflicts = ctx.detect_conflicts(&update_with_start(date));
            ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostRecent);
        }

        // Same identifier both times; recorded once
        assert_eq!(ctx.conflicts_resolved, vec!["date_conflict:start_date".to_string()]);
    }

    #[test]
    fn test_merge_strategy_unions_preferences() {
        let mut ctx = TripContext::new();
        ctx.preferences = vec!["luxury".into()];

        let conflict = Conflict::new(
            ConflictType::PreferenceConflict,
            "preferences",
            json!(["luxury"]),
            json!(["budget", "luxury"]),
            Severity::Low,
        );
        ctx.resolve_conflicts(&[conflict], ResolutionStrategy::Merge);

        assert_eq!(ctx.preferences, vec!["luxury".to_string(), "budget".to_string()]);
        assert_eq!(ctx.conflicts_resolved.len(), 1);
    }

    #[test]
    fn test_merge_strategy_noop_for_scalars() {
        let mut ctx = TripContext::new();
        ctx.start_date = Some("2024-06-01".into());

        let conflicts = ctx.detect_conflicts(&update_with_start("2024-07-01"));
        ctx.resolve_conflicts(&conflicts, ResolutionStrategy::Merge);

        assert_eq!(ctx.start_date.as_deref(), Some("2024-06-01"));
        assert!(ctx.conflicts_resolved.is_empty());
        assert_eq!(ctx.conflicts.len(), 1);
    }

    #[test]
    fn test_budget_conflict_numeric() {
        let mut ctx = TripContext::new();
        ctx.budget = Some(Budget::Exact {
            amount: 2000.0,
            currency: "USD".into(),
            per_person: false,
        });

        let update = ContextUpdate {
            budget: Some(Budget::Approximate {
                amount: 3000.0,
                currency: "USD".into(),
                per_person: false,
            }),
            ..Default::default()
        };

        let conflicts = ctx.detect_conflicts(&update);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::BudgetConflict);

        ctx.resolve_conflicts(&conflicts, ResolutionStrategy::MostRecent);
        assert_eq!(ctx.budget.as_ref().unwrap().amount(), 3000.0);
    }

    #[test]
    fn test_apply_update_unions_lists() {
        let mut ctx = TripContext::new();
        ctx.preferences = vec!["beach".into()];

        let update = ContextUpdate {
            preferences: vec!["beach".into(), "luxury".into()],
            destination_city: Some("Nice".into()),
            ..Default::default()
        };
        ctx.apply_update(&update);

        assert_eq!(ctx.preferences.len(), 2);
        assert_eq!(ctx.destination_city.as_deref(), Some("Nice"));
    }

    #[test]
    fn test_budget_serde_shape() {
        let budget = Budget::Range {
            min_amount: 1000.0,
            max_amount: 2000.0,
            currency: "EUR".into(),
        };
        let value = serde_json::to_value(&budget).unwrap();
        assert_eq!(value["type"], "range");
        assert_eq!(value["min_amount"], 1000.0);

        let exact: Budget = serde_json::from_value(json!({
            "type": "exact", "amount": 500.0, "currency": "USD", "per_person": true
        }))
        .unwrap();
        assert_eq!(exact.amount(), 500.0);
    }
}
