//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `properbot-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, writer for
//! mutations, reader for queries.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use properbot_core::chat::repository::ChatRepository;
use properbot_types::chat::{ChatMessage, ChatSession, SessionStatus};
use properbot_types::error::RepositoryError;
use properbot_types::listing::ListingQuery;
use properbot_types::llm::MessageRole;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    id: String,
    title: Option<String>,
    started_at: String,
    ended_at: Option<String>,
    total_input_tokens: i64,
    total_output_tokens: i64,
    message_count: i64,
    model: String,
    status: String,
    last_query: Option<String>,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
            total_input_tokens: row.try_get("total_input_tokens")?,
            total_output_tokens: row.try_get("total_output_tokens")?,
            message_count: row.try_get("message_count")?,
            model: row.try_get("model")?,
            status: row.try_get("status")?,
            last_query: row.try_get("last_query")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let started_at = parse_datetime(&self.started_at)?;
        let ended_at = self.ended_at.as_deref().map(parse_datetime).transpose()?;
        let status: SessionStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let last_query: Option<ListingQuery> = self
            .last_query
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid last_query: {e}")))?;

        Ok(ChatSession {
            id,
            title: self.title,
            started_at,
            ended_at,
            total_input_tokens: self.total_input_tokens as u32,
            total_output_tokens: self.total_output_tokens as u32,
            message_count: self.message_count as u32,
            model: self.model,
            status,
            last_query,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct ChatMessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
    input_tokens: Option<i64>,
    output_tokens: Option<i64>,
    model: Option<String>,
    stop_reason: Option<String>,
    response_ms: Option<i64>,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            input_tokens: row.try_get("input_tokens")?,
            output_tokens: row.try_get("output_tokens")?,
            model: row.try_get("model")?,
            stop_reason: row.try_get("stop_reason")?,
            response_ms: row.try_get("response_ms")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(ChatMessage {
            id,
            session_id,
            role,
            content: self.content,
            created_at,
            input_tokens: self.input_tokens.map(|v| v as u32),
            output_tokens: self.output_tokens.map(|v| v as u32),
            model: self.model,
            stop_reason: self.stop_reason,
            response_ms: self.response_ms.map(|v| v as u64),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        let last_query = session
            .last_query
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("serialize last_query: {e}")))?;

        sqlx::query(
            r#"INSERT INTO chat_sessions (id, title, started_at, ended_at, total_input_tokens, total_output_tokens, message_count, model, status, last_query)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(&session.title)
        .bind(format_datetime(&session.started_at))
        .bind(session.ended_at.as_ref().map(format_datetime))
        .bind(session.total_input_tokens as i64)
        .bind(session.total_output_tokens as i64)
        .bind(session.message_count as i64)
        .bind(&session.model)
        .bind(session.status.to_string())
        .bind(last_query)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(session.clone())
    }

    async fn get_session(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        let last_query = session
            .last_query
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("serialize last_query: {e}")))?;

        let result = sqlx::query(
            r#"UPDATE chat_sessions
               SET title = ?, ended_at = ?, total_input_tokens = ?, total_output_tokens = ?,
                   message_count = ?, status = ?, last_query = ?
               WHERE id = ?"#,
        )
        .bind(&session.title)
        .bind(session.ended_at.as_ref().map(format_datetime))
        .bind(session.total_input_tokens as i64)
        .bind(session.total_output_tokens as i64)
        .bind(session.message_count as i64)
        .bind(session.status.to_string())
        .bind(last_query)
        .bind(session.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_sessions(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let mut sql = String::from("SELECT * FROM chat_sessions ORDER BY started_at DESC");

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row = ChatSessionRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        // Insert the message
        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, role, content, created_at, input_tokens, output_tokens, model, stop_reason, response_ms)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .bind(message.input_tokens.map(|v| v as i64))
        .bind(message.output_tokens.map(|v| v as i64))
        .bind(&message.model)
        .bind(&message.stop_reason)
        .bind(message.response_ms.map(|v| v as i64))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Increment message_count on the session
        sqlx::query("UPDATE chat_sessions SET message_count = message_count + 1 WHERE id = ?")
            .bind(message.session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut sql = String::from(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC",
        );

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn clear_messages(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM chat_messages WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query("UPDATE chat_sessions SET message_count = 0 WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn save_last_query(
        &self,
        session_id: &Uuid,
        query: &ListingQuery,
    ) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(query)
            .map_err(|e| RepositoryError::Query(format!("serialize last_query: {e}")))?;

        let result = sqlx::query("UPDATE chat_sessions SET last_query = ? WHERE id = ?")
            .bind(json)
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_sessions")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_messages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_repo() -> (SqliteChatRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteChatRepository::new(pool), dir)
    }

    fn test_session() -> ChatSession {
        ChatSession {
            id: Uuid::now_v7(),
            title: None,
            started_at: Utc::now(),
            ended_at: None,
            total_input_tokens: 0,
            total_output_tokens: 0,
            message_count: 0,
            model: "gpt-4o-mini".to_string(),
            status: SessionStatus::Active,
            last_query: None,
        }
    }

    fn test_message(session_id: Uuid, role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            session_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
            input_tokens: None,
            output_tokens: None,
            model: None,
            stop_reason: None,
            response_ms: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (repo, _dir) = test_repo().await;
        let session = test_session();

        repo.create_session(&session).await.unwrap();
        let loaded = repo.get_session(&session.id).await.unwrap().unwrap();

        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.status, SessionStatus::Active);
        assert!(loaded.last_query.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_session() {
        let (repo, _dir) = test_repo().await;
        let result = repo.get_session(&Uuid::now_v7()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_session() {
        let (repo, _dir) = test_repo().await;
        let mut session = test_session();
        repo.create_session(&session).await.unwrap();

        session.title = Some("San Mateo search".to_string());
        session.total_input_tokens = 500;
        session.status = SessionStatus::Completed;
        repo.update_session(&session).await.unwrap();

        let loaded = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.title.as_deref(), Some("San Mateo search"));
        assert_eq!(loaded.total_input_tokens, 500);
        assert_eq!(loaded.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_missing_session_is_not_found() {
        let (repo, _dir) = test_repo().await;
        let session = test_session();
        let err = repo.update_session(&session).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_save_message_increments_count() {
        let (repo, _dir) = test_repo().await;
        let session = test_session();
        repo.create_session(&session).await.unwrap();

        repo.save_message(&test_message(session.id, MessageRole::User, "hi"))
            .await
            .unwrap();
        repo.save_message(&test_message(session.id, MessageRole::Assistant, "hello"))
            .await
            .unwrap();

        let loaded = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.message_count, 2);

        let messages = repo.get_messages(&session.id, None, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_clear_messages_resets_count() {
        let (repo, _dir) = test_repo().await;
        let session = test_session();
        repo.create_session(&session).await.unwrap();
        repo.save_message(&test_message(session.id, MessageRole::User, "hi"))
            .await
            .unwrap();

        repo.clear_messages(&session.id).await.unwrap();

        let loaded = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.message_count, 0);
        assert!(repo.get_messages(&session.id, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload_last_query() {
        let (repo, _dir) = test_repo().await;
        let session = test_session();
        repo.create_session(&session).await.unwrap();

        let query = ListingQuery {
            max_price: Some(1_000_000.0),
            requires_garage: Some(true),
            ..ListingQuery::for_sale("San Mateo, CA")
        };
        repo.save_last_query(&session.id, &query).await.unwrap();

        let loaded = repo.get_session(&session.id).await.unwrap().unwrap();
        let reloaded = loaded.last_query.unwrap();
        assert_eq!(reloaded.location, "San Mateo, CA");
        assert_eq!(reloaded.max_price, Some(1_000_000.0));
        assert_eq!(reloaded.requires_garage, Some(true));
    }

    #[tokio::test]
    async fn test_delete_session_cascades_messages() {
        let (repo, _dir) = test_repo().await;
        let session = test_session();
        repo.create_session(&session).await.unwrap();
        repo.save_message(&test_message(session.id, MessageRole::User, "hi"))
            .await
            .unwrap();

        repo.delete_session(&session.id).await.unwrap();

        assert!(repo.get_session(&session.id).await.unwrap().is_none());
        assert!(repo.get_messages(&session.id, None, None).await.unwrap().is_empty());
        assert_eq!(repo.count_messages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_sessions_ordered_and_limited() {
        let (repo, _dir) = test_repo().await;
        for _ in 0..3 {
            repo.create_session(&test_session()).await.unwrap();
        }

        let all = repo.list_sessions(None, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let limited = repo.list_sessions(Some(2), None).await.unwrap();
        assert_eq!(limited.len(), 2);

        assert_eq!(repo.count_sessions().await.unwrap(), 3);
    }
}
