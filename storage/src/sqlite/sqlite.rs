#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;

use std::path::Path;

use async_trait::async_trait;
use recall_models::{
    Context, Conversation, HistoryEntry, Message, StoreError,
    storage::{CreateConversation, MessageFilter},
};
use tokio_rusqlite::{Connection, ErrorCode, OpenFlags, ToSql, named_params, params};
use uuid::Uuid;

use crate::Storage;

use super::migration::MIGRATION;

pub struct Sqlite {
    conn: Connection,
}

impl Sqlite {
    /// Opens (or creates) the database at `path` and certifies it for use:
    /// parent directories are created, foreign-key enforcement is enabled,
    /// the schema is created if absent, and the health check runs. `None`
    /// opens an in-memory database.
    ///
    /// Any failure here means the store cannot be trusted and surfaces as
    /// [`StoreError::Unavailable`].
    pub async fn new(path: Option<&str>) -> Result<Self, StoreError> {
        let conn = match path {
            Some(path) => {
                if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(dir).await.map_err(|err| {
                        StoreError::Unavailable(format!(
                            "creating database directory {}: {}",
                            dir.display(),
                            err
                        ))
                    })?;
                }
                Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
                )
                .await
                .map_err(|err| {
                    StoreError::Unavailable(format!("opening database path {}: {}", path, err))
                })?
            }
            None => Connection::open_in_memory().await.map_err(|err| {
                StoreError::Unavailable(format!("opening in-memory database: {}", err))
            })?,
        };

        let store = Self { conn };
        store.enable_foreign_keys().await?;
        store.run_migration().await?;
        store.check_health().await?;
        Ok(store)
    }

    async fn enable_foreign_keys(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| Ok(conn.execute_batch("PRAGMA foreign_keys = ON;")?))
            .await
            .map_err(|err| {
                StoreError::Unavailable(format!("enabling foreign keys: {}", err))
            })
    }

    async fn run_migration(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| Ok(conn.execute_batch(MIGRATION)?))
            .await
            .map_err(|err| StoreError::Unavailable(format!("executing migration: {}", err)))
    }

    /// Probes connectivity, transactional capability, and that foreign-key
    /// enforcement is actually active. SQLite honors the enable pragma per
    /// connection, so the flag is read back instead of trusted.
    async fn check_health(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

                let tx = conn.transaction()?;
                tx.commit()?;

                let enabled: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
                if enabled != 1 {
                    return Err(tokio_rusqlite::Error::Other(
                        "foreign key enforcement is not active".into(),
                    ));
                }
                Ok(())
            })
            .await
            .map_err(|err| {
                log::error!("sqlite health check failed: {}", err);
                StoreError::Unavailable(format!("health check: {}", err))
            })?;

        log::info!("sqlite health check passed");
        Ok(())
    }
}

#[async_trait]
impl Storage for Sqlite {
    async fn create_conversation(
        &self,
        request: CreateConversation,
    ) -> Result<String, StoreError> {
        let (id, metadata) = request.into_parts();
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let metadata = metadata.map(|m| serde_json::to_string(&m)).transpose()?;

        let conversation = Conversation::new(id.clone());
        log::info!("creating conversation {}", id);

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO conversations (id, user, platform, created_at, metadata)
                     VALUES (:id, :user, :platform, :created_at, :metadata)",
                    named_params! {
                        ":id": conversation.id(),
                        ":user": conversation.user(),
                        ":platform": conversation.platform(),
                        ":created_at": conversation.created_at().timestamp_millis(),
                        ":metadata": metadata,
                    },
                )?;
                Ok(())
            })
            .await
            .map_err(|err| {
                if is_constraint_violation(&err) {
                    StoreError::DuplicateKey(id.clone())
                } else {
                    StoreError::Database(err.to_string())
                }
            })?;

        Ok(id)
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation, StoreError> {
        let id = conversation_id.to_string();
        let conversation = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, created_at, metadata FROM conversations WHERE id = ?",
                )?;
                let mut rows = stmt.query(params![id])?;

                let mut found: Option<(Conversation, Option<String>)> = None;
                if let Some(row) = rows.next()? {
                    let id: String = row.get(0)?;
                    let created_at: i64 = row.get(1)?;
                    let metadata: Option<String> = row.get(2)?;
                    let created_at = chrono::DateTime::from_timestamp_millis(created_at).ok_or(
                        tokio_rusqlite::Error::Other("invalid created_at".into()),
                    )?;

                    found = Some((Conversation::new(id).with_created_at(created_at), metadata));
                }
                Ok(found)
            })
            .await
            .map_err(|err| StoreError::Database(err.to_string()))?;

        let Some((mut conversation, raw_metadata)) = conversation else {
            return Err(StoreError::NotFound(conversation_id.to_string()));
        };

        if let Some(raw) = raw_metadata {
            let metadata: serde_json::Value = serde_json::from_str(&raw)?;
            conversation = conversation.with_metadata(metadata);
        }

        let messages = self
            .get_messages(MessageFilter::default().with_conversation_id(conversation_id))
            .await?;
        let contexts = self.get_contexts(conversation_id).await?;
        log::debug!(
            "retrieved conversation {} ({} messages, {} contexts)",
            conversation_id,
            messages.len(),
            contexts.len()
        );

        Ok(conversation.with_messages(messages).with_contexts(contexts))
    }

    async fn get_messages(&self, filter: MessageFilter) -> Result<Vec<Message>, StoreError> {
        if filter.conversation_id().is_none() {
            return Err(StoreError::InvalidArgument(
                "conversation id is required to query messages",
            ));
        }

        let messages = self
            .conn
            .call(move |conn| {
                let (query, params) = filter_to_query(&filter);
                let mut stmt = conn.prepare(&query)?;
                let params: Vec<(&str, &dyn ToSql)> =
                    params.iter().map(|(n, v)| (*n, v.as_ref())).collect();
                let mut rows = stmt.query(params.as_slice())?;

                let mut messages = vec![];
                while let Some(row) = rows.next()? {
                    let id: String = row.get(0)?;
                    let conversation_id: String = row.get(1)?;
                    let role: String = row.get(2)?;
                    let content: String = row.get(3)?;
                    let timestamp: i64 = row.get(4)?;
                    let context_id: Option<String> = row.get(5)?;
                    let user_message_id: Option<String> = row.get(6)?;

                    let timestamp = chrono::DateTime::from_timestamp_millis(timestamp).ok_or(
                        tokio_rusqlite::Error::Other("invalid timestamp".into()),
                    )?;

                    let mut message = Message::new(role, content)
                        .with_id(id)
                        .with_conversation_id(conversation_id)
                        .with_timestamp(timestamp);
                    if let Some(context_id) = context_id {
                        message = message.with_context_id(context_id);
                    }
                    if let Some(user_message_id) = user_message_id {
                        message = message.with_user_message_id(user_message_id);
                    }
                    messages.push(message);
                }
                Ok(messages)
            })
            .await
            .map_err(|err| StoreError::Database(err.to_string()))?;

        Ok(messages)
    }

    async fn get_contexts(&self, conversation_id: &str) -> Result<Vec<Context>, StoreError> {
        let conversation_id = conversation_id.to_string();
        let contexts = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, conversation_id, type, content, timestamp FROM contexts WHERE conversation_id = ?",
                )?;
                let mut rows = stmt.query(params![conversation_id])?;

                let mut contexts = vec![];
                while let Some(row) = rows.next()? {
                    let id: String = row.get(0)?;
                    let conversation_id: String = row.get(1)?;
                    let kind: String = row.get(2)?;
                    let content: String = row.get(3)?;
                    let timestamp: i64 = row.get(4)?;
                    let timestamp = chrono::DateTime::from_timestamp_millis(timestamp).ok_or(
                        tokio_rusqlite::Error::Other("invalid timestamp".into()),
                    )?;

                    contexts.push(
                        Context::new(kind, content)
                            .with_id(id)
                            .with_conversation_id(conversation_id)
                            .with_timestamp(timestamp),
                    );
                }
                Ok(contexts)
            })
            .await
            .map_err(|err| StoreError::Database(err.to_string()))?;

        Ok(contexts)
    }

    async fn get_history(&self, conversation_id: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        let conversation_id = conversation_id.to_string();
        let entries = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, conversation_id, type, content, timestamp FROM history WHERE conversation_id = ?",
                )?;
                let mut rows = stmt.query(params![conversation_id])?;

                let mut entries = vec![];
                while let Some(row) = rows.next()? {
                    let id: String = row.get(0)?;
                    let conversation_id: String = row.get(1)?;
                    let kind: String = row.get(2)?;
                    let content: String = row.get(3)?;
                    let timestamp: i64 = row.get(4)?;
                    let timestamp = chrono::DateTime::from_timestamp_millis(timestamp).ok_or(
                        tokio_rusqlite::Error::Other("invalid timestamp".into()),
                    )?;

                    entries.push(
                        HistoryEntry::new(kind, content)
                            .with_id(id)
                            .with_conversation_id(conversation_id)
                            .with_timestamp(timestamp),
                    );
                }
                Ok(entries)
            })
            .await
            .map_err(|err| StoreError::Database(err.to_string()))?;

        Ok(entries)
    }

    async fn store_message(
        &self,
        message: Message,
        conversation_id: &str,
    ) -> Result<(), StoreError> {
        let conversation_id = conversation_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO messages (id, conversation_id, role, content, timestamp, context_id, user_message_id)
                     VALUES (:id, :conversation_id, :role, :content, :timestamp, :context_id, :user_message_id)",
                    named_params! {
                        ":id": message.id(),
                        ":conversation_id": conversation_id,
                        ":role": message.role(),
                        ":content": message.content(),
                        ":timestamp": message.timestamp().timestamp_millis(),
                        ":context_id": message.context_id(),
                        ":user_message_id": message.user_message_id(),
                    },
                )?;
                Ok(())
            })
            .await
            .map_err(write_error)
    }

    async fn store_context(
        &self,
        context: Context,
        conversation_id: &str,
    ) -> Result<(), StoreError> {
        let conversation_id = conversation_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO contexts (id, conversation_id, type, content, timestamp)
                     VALUES (:id, :conversation_id, :type, :content, :timestamp)",
                    named_params! {
                        ":id": context.id(),
                        ":conversation_id": conversation_id,
                        ":type": context.kind(),
                        ":content": context.content(),
                        ":timestamp": context.timestamp().timestamp_millis(),
                    },
                )?;
                Ok(())
            })
            .await
            .map_err(write_error)
    }

    async fn store_history(
        &self,
        entry: HistoryEntry,
        conversation_id: &str,
    ) -> Result<(), StoreError> {
        let conversation_id = conversation_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO history (id, conversation_id, type, content, timestamp)
                     VALUES (:id, :conversation_id, :type, :content, :timestamp)",
                    named_params! {
                        ":id": entry.id(),
                        ":conversation_id": conversation_id,
                        ":type": entry.kind(),
                        ":content": entry.content(),
                        ":timestamp": entry.timestamp().timestamp_millis(),
                    },
                )?;
                Ok(())
            })
            .await
            .map_err(write_error)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), StoreError> {
        let id = conversation_id.to_string();
        self.conn
            .call(move |conn| {
                // Dependents first: messages reference contexts and the
                // conversation; contexts reference the conversation.
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM messages WHERE conversation_id = ?", params![id])?;
                tx.execute("DELETE FROM contexts WHERE conversation_id = ?", params![id])?;
                tx.execute("DELETE FROM conversations WHERE id = ?", params![id])?;
                Ok(tx.commit()?)
            })
            .await
            .map_err(|err| {
                log::error!("failed to delete conversation {}: {}", conversation_id, err);
                StoreError::TransactionFailed(err.to_string())
            })
    }

    async fn delete_history(&self, conversation_id: &str) -> Result<(), StoreError> {
        let conversation_id = conversation_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM history WHERE conversation_id = ?",
                    params![conversation_id],
                )?;
                Ok(())
            })
            .await
            .map_err(|err| StoreError::Database(err.to_string()))
    }
}

fn filter_to_query(filter: &MessageFilter) -> (String, Vec<(&str, Box<dyn ToSql>)>) {
    let mut query = String::from(
        "SELECT id, conversation_id, role, content, timestamp, context_id, user_message_id FROM messages WHERE conversation_id = :conversation_id",
    );
    let mut params: Vec<(&str, Box<dyn ToSql>)> = vec![(
        ":conversation_id",
        Box::new(filter.conversation_id().unwrap_or_default().to_string()),
    )];

    if let Some(after) = filter.after() {
        query.push_str(" AND timestamp > :after");
        params.push((":after", Box::new(after.timestamp_millis())));
    }

    if let Some(before) = filter.before() {
        query.push_str(" AND timestamp < :before");
        params.push((":before", Box::new(before.timestamp_millis())));
    }

    query.push_str(" ORDER BY timestamp DESC");

    if let Some(limit) = filter.limit() {
        query.push_str(" LIMIT :limit");
        params.push((":limit", Box::new(i64::try_from(limit).unwrap_or(i64::MAX))));
    }

    (query, params)
}

fn is_constraint_violation(err: &tokio_rusqlite::Error) -> bool {
    matches!(
        err,
        tokio_rusqlite::Error::Rusqlite(e)
            if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
    )
}

fn write_error(err: tokio_rusqlite::Error) -> StoreError {
    if is_constraint_violation(&err) {
        StoreError::ConstraintViolation(err.to_string())
    } else {
        StoreError::Database(err.to_string())
    }
}
