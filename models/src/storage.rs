/// Request for creating a conversation. Both fields are optional: a missing
/// id is replaced by a generated UUID, and metadata is stored verbatim as
/// serialized JSON.
#[derive(Debug, Clone, Default)]
pub struct CreateConversation {
    id: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl CreateConversation {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    pub fn into_parts(self) -> (Option<String>, Option<serde_json::Value>) {
        (self.id, self.metadata)
    }
}

/// Filter for message queries. The conversation id is required by the store;
/// the time bounds are strict (exclusive) and the limit caps the result to
/// the most recent rows.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    conversation_id: Option<String>,
    after: Option<chrono::DateTime<chrono::Utc>>,
    before: Option<chrono::DateTime<chrono::Utc>>,
    limit: Option<usize>,
}

impl MessageFilter {
    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_after(mut self, after: chrono::DateTime<chrono::Utc>) -> Self {
        self.after = Some(after);
        self
    }

    pub fn with_before(mut self, before: chrono::DateTime<chrono::Utc>) -> Self {
        self.before = Some(before);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn after(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.after
    }

    pub fn before(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.before
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
