//! Chat message model shared by the session, the renderer, and the transcript.

use uuid::Uuid;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
    Error,
}

/// A grounding citation returned alongside an agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// One message in the conversation.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub sources: Vec<Source>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            sources,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, Vec::new())
    }

    pub fn agent(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self::new(Role::Agent, text, sources)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Role::Error, text, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_get_unique_ids() {
        let a = ChatMessage::user("hi");
        let b = ChatMessage::user("hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn role_constructors() {
        assert_eq!(ChatMessage::user("x").role, Role::User);
        assert_eq!(ChatMessage::agent("x", Vec::new()).role, Role::Agent);
        assert_eq!(ChatMessage::error("x").role, Role::Error);
    }
}
