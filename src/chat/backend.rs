//! The chat completion collaborator the node forwards requests to
//!
//! Only the request/response contract lives here. Talking to the remote API
//! (request encoding, retries, model lists) belongs to whoever implements
//! [`ChatBackend`].

use super::session::SessionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Author of a message
///
/// Roles other than the three the node writes are kept verbatim so that
/// conversations written by other tools still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other(role),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

/// One message of a conversation, as persisted in session files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// An encoded image attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Name of the socket the image arrived on, e.g. `image_2`
    pub label: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f32,
    /// Keep history across runs in a chat session
    pub chat_mode: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: "openai/gpt-4o-mini".to_string(),
            temperature: 1.0,
            chat_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub images: Vec<ImageAttachment>,
    pub options: ChatOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub usage: UsageStats,
    /// Remaining account credit, when the provider reports it
    pub credit_balance: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Request(String),

    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Sends one chat completion request
pub trait ChatBackend {
    fn send_chat_request(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_json_shape() {
        let message = ChatMessage::user("hello");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));

        let stamped: ChatMessage = serde_json::from_str(
            r#"{"role":"assistant","content":"hi","timestamp":"2025-01-02T03:04:05"}"#,
        )
        .unwrap();
        assert_eq!(stamped.role, Role::Assistant);
        assert_eq!(stamped.timestamp.as_deref(), Some("2025-01-02T03:04:05"));
    }

    #[test]
    fn test_unknown_role_is_kept() {
        let message: ChatMessage = serde_json::from_str(r#"{"role":"tool","content":"42"}"#).unwrap();
        assert_eq!(message.role, Role::Other("tool".to_string()));
        assert_eq!(message.role.as_str(), "tool");
        assert_eq!(serde_json::to_value(&message).unwrap()["role"], "tool");
        assert_eq!(Role::from("user".to_string()), Role::User);
    }
}
