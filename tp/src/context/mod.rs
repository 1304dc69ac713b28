//! Trip context and the conflict/merge engine
//!
//! [`TripContext`] accumulates what the conversation has established about
//! one trip. Contradictions between accumulated state and newly extracted
//! entities surface as explicit [`Conflict`] records and are settled by a
//! [`ResolutionStrategy`].

mod conflict;
mod trip;

pub use conflict::{Conflict, ConflictType, ResolutionStrategy, Severity};
pub use trip::{Budget, ContextUpdate, Travelers, TripContext};
