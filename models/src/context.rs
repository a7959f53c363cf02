use uuid::Uuid;

/// A structured artifact attached to a conversation (extracted document text,
/// tool output), distinct from a chat message. Append-only.
#[derive(Debug, Clone)]
pub struct Context {
    id: String,
    conversation_id: Option<String>,
    kind: String,
    content: String,
    timestamp: chrono::DateTime<chrono::Utc>,
}

impl Context {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: None,
            kind: kind.into(),
            content: content.into(),
            timestamp: chrono::Utc::now(),
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

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        self.timestamp
    }
}
