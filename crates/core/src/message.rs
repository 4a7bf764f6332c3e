//! Message domain types.
//!
//! A conversation is an ordered list of messages, most recent last. The
//! router reads the tail of that list to build the classification prompt.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

impl Role {
    /// Upper-case label used when a turn is quoted inside a prompt.
    pub fn label(self) -> &'static str {
        match self {
            Role::System => "SYSTEM",
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

/// A single conversation turn.
///
/// Hosts may send `content` as a plain string or as a list of typed parts
/// (text, images). A part list is kept verbatim in `parts` so it survives
/// the round trip, and its text parts are joined into `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireMessage", into = "WireMessage")]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Original content parts; empty for plain-text messages
    pub parts: Vec<Value>,
}

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            parts: Vec::new(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: Option<WireContent>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<Value>),
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        match wire.content {
            None => Self::text(wire.role, ""),
            Some(WireContent::Text(text)) => Self::text(wire.role, text),
            Some(WireContent::Parts(parts)) => {
                let content = parts
                    .iter()
                    .filter(|p| p["type"] == "text")
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                Self {
                    role: wire.role,
                    content,
                    parts,
                }
            }
        }
    }
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        let content = if message.parts.is_empty() {
            WireContent::Text(message.content)
        } else {
            WireContent::Parts(message.parts)
        };
        Self {
            role: message.role,
            content: Some(content),
        }
    }
}

/// Content of the most recent user message, if any.
pub fn last_user_message(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}
