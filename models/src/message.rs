use uuid::Uuid;

/// One chat message in a conversation. Append-only; never updated in place.
///
/// `context_id` links the message to the context item that produced it, and
/// `user_message_id` links an assistant reply back to the user message it
/// answers. Both are optional and enforced by the store's foreign keys.
#[derive(Debug, Clone)]
pub struct Message {
    id: String,
    conversation_id: Option<String>,
    role: String,
    content: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    context_id: Option<String>,
    user_message_id: Option<String>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: None,
            role: role.into(),
            content: content.into(),
            timestamp: chrono::Utc::now(),
            context_id: None,
            user_message_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    pub fn with_user_message_id(mut self, user_message_id: impl Into<String>) -> Self {
        self.user_message_id = Some(user_message_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        self.timestamp
    }

    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    pub fn user_message_id(&self) -> Option<&str> {
        self.user_message_id.as_deref()
    }
}
