//! Extracted travel entity shapes

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::context::{Budget, ContextUpdate, Travelers};
use crate::resolver::Resolution;

/// Which leg of the trip a mentioned place belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationRole {
    Departure,
    Destination,
}

/// One place mention paired with its resolver outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationEntity {
    /// The phrase as the user wrote it
    pub text: String,
    pub role: DestinationRole,
    pub resolution: Resolution,
}

/// Everything a single message yielded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelEntities {
    pub destinations: Vec<DestinationEntity>,
    pub departure_city: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub travelers: Option<Travelers>,
    pub budget: Option<Budget>,
    pub duration_days: Option<u32>,
    pub preferences: Vec<String>,
    pub trip_type: Option<String>,
    pub trip_purpose: Option<String>,
}

impl TravelEntities {
    /// Project into the shape the context merge pass consumes
    pub fn to_update(&self) -> ContextUpdate {
        let destination_city = self
            .destinations
            .iter()
            .find(|d| d.role == DestinationRole::Destination)
            .and_then(|d| d.resolution.city_name.clone());

        ContextUpdate {
            departure_city: self.departure_city.clone(),
            destination_city,
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            travelers: self.travelers,
            budget: self.budget.clone(),
            duration_days: self.duration_days,
            destinations: self
                .destinations
                .iter()
                .filter(|d| d.role == DestinationRole::Destination)
                .map(|d| d.resolution.clone())
                .collect(),
            preferences: self.preferences.clone(),
            city_durations: HashMap::new(),
            trip_type: self.trip_type.clone(),
            trip_purpose: self.trip_purpose.clone(),
        }
    }
}
