use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One transcript entry. Values are never mutated in place; streaming growth
/// produces a new message via [`ChatMessage::extended`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Copy of this message with `delta` appended. Role and timestamp are kept.
    pub fn extended(&self, delta: &str) -> Self {
        let mut text = String::with_capacity(self.text.len() + delta.len());
        text.push_str(&self.text);
        text.push_str(delta);
        Self {
            role: self.role,
            text,
            timestamp: self.timestamp,
        }
    }

    /// Copy of this message with its text replaced.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            role: self.role,
            text: text.into(),
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_keeps_original_untouched() {
        let original = ChatMessage::model("Hel");
        let grown = original.extended("lo");
        assert_eq!(original.text, "Hel");
        assert_eq!(grown.text, "Hello");
        assert_eq!(grown.timestamp, original.timestamp);
        assert_eq!(grown.role, Role::Model);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
    }
}
