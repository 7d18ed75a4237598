use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message in a session history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversationTurn, TurnRole};

    #[test]
    fn constructors_set_roles() {
        assert_eq!(ConversationTurn::user("hi").role, TurnRole::User);
        assert_eq!(ConversationTurn::assistant("hello").role, TurnRole::Assistant);
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&TurnRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&TurnRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
