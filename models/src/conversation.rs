#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use uuid::Uuid;

use crate::{Context, Message};

/// Root entity grouping the messages and context items exchanged with one
/// counterparty on one platform. The `user` and `platform` fields are derived
/// from the identifier by splitting it on its first `-`.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    user: String,
    platform: String,
    created_at: chrono::DateTime<chrono::Utc>,
    metadata: Option<serde_json::Value>,
    messages: Vec<Message>,
    contexts: Vec<Context>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let (user, platform) = split_identity(&id);
        Self {
            id,
            user,
            platform,
            created_at: chrono::Utc::now(),
            metadata: None,
            messages: Vec::new(),
            contexts: Vec::new(),
        }
    }

    pub fn with_created_at(mut self, created_at: chrono::DateTime<chrono::Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_contexts(mut self, contexts: Vec<Context>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    pub fn contexts_mut(&mut self) -> &mut Vec<Context> {
        &mut self.contexts
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

/// Splits a conversation identifier into its `(user, platform)` parts on the
/// first `-`. An identifier without a delimiter yields the full identifier as
/// user and an empty platform.
pub fn split_identity(id: &str) -> (String, String) {
    match id.split_once('-') {
        Some((user, platform)) => (user.to_string(), platform.to_string()),
        None => (id.to_string(), String::new()),
    }
}
