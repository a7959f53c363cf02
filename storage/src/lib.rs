pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use recall_models::{
    Context, Conversation, HistoryEntry, Message, StoreError,
    configuration::StorageConfig,
    storage::{CreateConversation, MessageFilter},
};
use sqlite::Sqlite;

/// Durable, queryable storage for an agent's interaction history.
///
/// Write operations are single-statement and row-atomic. The only
/// multi-statement transaction is [`Storage::delete_conversation`], which
/// removes a conversation together with its messages and contexts or nothing
/// at all. History entries live in an independent log and are deleted
/// separately via [`Storage::delete_history`].
#[async_trait]
pub trait Storage {
    /// Creates a conversation and returns its identifier. A missing id in the
    /// request is replaced by a generated UUID. Fails with
    /// [`StoreError::DuplicateKey`] when the identifier already exists.
    async fn create_conversation(
        &self,
        request: CreateConversation,
    ) -> Result<String, StoreError>;

    /// Returns the conversation row composed with its full message and
    /// context lists. Fails with [`StoreError::NotFound`] when no such
    /// conversation exists.
    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation, StoreError>;

    /// Returns messages matching the filter, most recent first. The filter's
    /// conversation id is required.
    async fn get_messages(&self, filter: MessageFilter) -> Result<Vec<Message>, StoreError>;

    async fn get_contexts(&self, conversation_id: &str) -> Result<Vec<Context>, StoreError>;

    async fn get_history(&self, conversation_id: &str) -> Result<Vec<HistoryEntry>, StoreError>;

    async fn store_message(
        &self,
        message: Message,
        conversation_id: &str,
    ) -> Result<(), StoreError>;

    async fn store_context(
        &self,
        context: Context,
        conversation_id: &str,
    ) -> Result<(), StoreError>;

    async fn store_history(
        &self,
        entry: HistoryEntry,
        conversation_id: &str,
    ) -> Result<(), StoreError>;

    /// Deletes the conversation and all of its messages and contexts in one
    /// transaction. History entries are not touched.
    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), StoreError>;

    /// Deletes all history entries for the conversation.
    async fn delete_history(&self, conversation_id: &str) -> Result<(), StoreError>;
}

pub type ArcStorage = Arc<dyn Storage + Send + Sync>;

pub async fn new_storage(config: &StorageConfig) -> Result<ArcStorage, StoreError> {
    let storage = match config {
        StorageConfig::Sqlite(sqlite_config) => Arc::new(Sqlite::new(sqlite_config.path()).await?),
    };
    Ok(storage)
}
