//! TripPlanner - conversational trip-context resolution core
//!
//! Turns free-text chat messages into structured, accumulating trip state.
//! Two subsystems carry the real logic:
//!
//! - **Destination resolution**: a five-layer fallback chain (direct code
//!   match, fuzzy matching, regional mapping, geocoding, LLM interpretation)
//!   mapping natural-language destination phrases to airport/city codes with
//!   confidence scores.
//! - **Context merge engine**: reconciles newly extracted entities against
//!   the session's accumulated [`TripContext`], detecting contradictions
//!   (dates, destinations, travelers, budget) and settling them through
//!   pluggable resolution strategies.
//!
//! # Core Concepts
//!
//! - **Cheapest layer first**: resolution layers run in strict order and
//!   short-circuit as soon as one meets its confidence threshold
//! - **Degrade, never throw**: collaborator failures (LLM, geocoding, cache)
//!   become lower-confidence results, not errors crossing public methods
//! - **Conflicts are values**: contradictions surface as explicit
//!   [`Conflict`] records with a recorded resolution, not silent overwrites
//!
//! # Modules
//!
//! - [`resolver`] - Five-layer destination resolver
//! - [`context`] - Trip context, conflict detection and resolution
//! - [`service`] - Entity extraction, merging, validation, questions
//! - [`llm`] - LLM client trait and Anthropic implementation
//! - [`geo`] - Geocoding client trait and HTTP implementation
//! - [`session`] - Session repository abstraction
//! - [`config`] - Configuration types and loading

pub mod config;
pub mod context;
pub mod geo;
pub mod llm;
pub mod resolver;
pub mod service;
pub mod session;

// Re-export commonly used types
pub use config::{Config, GeocodingConfig, LlmConfig, ResolverConfig};
pub use context::{
    Budget, Conflict, ConflictType, ContextUpdate, ResolutionStrategy, Severity, Travelers, TripContext,
};
pub use geo::{GeoError, GeocodedPlace, Geocoder, HttpGeocoder};
pub use llm::{AnthropicClient, CompletionRequest, LlmClient, LlmError, Message, Role};
pub use resolver::{DestinationResolver, Resolution, ResolvedPlace, Suggestion};
pub use service::{TravelEntities, TripContextService, ValidationReport};
pub use session::{MemorySessionRepository, SessionId, SessionRepository};
