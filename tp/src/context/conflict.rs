//! Conflict records and resolution strategies
//!
//! Conflicts are explicit values, not hidden errors: when new information
//! contradicts accumulated trip state, a Conflict record describes the
//! contradiction and its eventual resolution is tracked on the context.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The dimension a conflict occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    DateConflict,
    DestinationConflict,
    TravelerConflict,
    BudgetConflict,
    DurationConflict,
    PreferenceConflict,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::DateConflict => "date_conflict",
            ConflictType::DestinationConflict => "destination_conflict",
            ConflictType::TravelerConflict => "traveler_conflict",
            ConflictType::BudgetConflict => "budget_conflict",
            ConflictType::DurationConflict => "duration_conflict",
            ConflictType::PreferenceConflict => "preference_conflict",
        }
    }
}

/// How consequential a contradiction is for downstream search/booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One detected contradiction between existing context and new data
///
/// Produced fresh on every update attempt; never persisted independently of
/// the owning TripContext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    /// Dotted path of the conflicting field ("travelers.adults")
    pub field: String,
    pub existing: Value,
    pub new: Value,
    pub severity: Severity,
}

impl Conflict {
    pub fn new(conflict_type: ConflictType, field: impl Into<String>, existing: Value, new: Value, severity: Severity) -> Self {
        Self {
            conflict_type,
            field: field.into(),
            existing,
            new,
            severity,
        }
    }

    /// Stable identifier recorded in `conflicts_resolved`
    pub fn id(&self) -> String {
        format!("{}:{}", self.conflict_type.as_str(), self.field)
    }
}

/// Policy for settling detected conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// New value always wins
    MostRecent,
    /// New value wins only when judged more specific than the existing one
    MostSpecific,
    /// Deduplicated union for list-valued fields; no-op otherwise
    Merge,
    /// Delegate to the LLM (service layer only; falls back to MostRecent)
    AiResolution,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conflict_id() {
        let conflict = Conflict::new(
            ConflictType::DateConflict,
            "start_date",
            json!("2024-06-01"),
            json!("2024-07-01"),
            Severity::High,
        );
        assert_eq!(conflict.id(), "date_conflict:start_date");
    }

    #[test]
    fn test_conflict_serialization_shape() {
        let conflict = Conflict::new(
            ConflictType::TravelerConflict,
            "travelers.adults",
            json!(1),
            json!(2),
            Severity::Medium,
        );

        let value = serde_json::to_value(&conflict).unwrap();
        assert_eq!(value["type"], "TRAVELER_CONFLICT");
        assert_eq!(value["severity"], "medium");
        assert_eq!(value["field"], "travelers.adults");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
