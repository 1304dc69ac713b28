//! LLM client trait

use async_trait::async_trait;

use super::{CompletionRequest, LlmError};

/// Text-completion port for LLM collaborators
///
/// Implementations must be Send + Sync so a single client can be shared
/// across concurrent resolution chains behind an Arc.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion request, returning the model's text reply
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError>;
}
