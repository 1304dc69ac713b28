//! LLM request types for TripPlanner
//!
//! Models the Anthropic Messages API but stays provider-agnostic: a system
//! role is carried on the message itself and split out per provider.

use serde::{Deserialize, Serialize};

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation messages; at most one System message, first
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 for extraction/interpretation calls)
    pub temperature: f32,

    /// Max tokens for the response
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Request with a system prompt and a single user message
    ///
    /// Extraction and interpretation calls all use this shape, at
    /// temperature 0 for reproducible JSON.
    pub fn structured(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(user)],
            temperature: 0.0,
            max_tokens,
        }
    }

    /// System prompt, if the first message carries one
    pub fn system_prompt(&self) -> Option<&str> {
        match self.messages.first() {
            Some(Message {
                role: Role::System,
                content,
            }) => Some(content),
            _ => None,
        }
    }

    /// Messages excluding any leading system message
    pub fn conversation(&self) -> &[Message] {
        if self.system_prompt().is_some() {
            &self.messages[1..]
        } else {
            &self.messages
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");

        let msg = Message::assistant("Hi there");
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_structured_request_splits_system() {
        let request = CompletionRequest::structured("You extract JSON", "2 adults to Paris", 256);

        assert_eq!(request.system_prompt(), Some("You extract JSON"));
        assert_eq!(request.conversation().len(), 1);
        assert_eq!(request.conversation()[0].role, Role::User);
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn test_conversation_without_system() {
        let request = CompletionRequest {
            messages: vec![Message::user("hi")],
            temperature: 0.7,
            max_tokens: 100,
        };

        assert_eq!(request.system_prompt(), None);
        assert_eq!(request.conversation().len(), 1);
    }
}
