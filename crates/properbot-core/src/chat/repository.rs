//! ChatRepository trait definition.
//!
//! Provides CRUD operations for chat sessions and messages, plus
//! persistence of the structured query carried across turns.

use properbot_types::chat::{ChatMessage, ChatSession};
use properbot_types::error::RepositoryError;
use properbot_types::listing::ListingQuery;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
///
/// Implementations live in properbot-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Create a new chat session.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Update an existing chat session (e.g., token counts, status, query).
    fn update_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List sessions, ordered by started_at DESC.
    fn list_sessions(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Delete a chat session and its messages.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Save a new message within a session.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get messages for a session, ordered by created_at ASC.
    fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Clear all messages from a session, resetting message_count to 0.
    ///
    /// Keeps the session record intact but removes all chat_messages.
    fn clear_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Persist the structured query extracted on the latest search turn.
    fn save_last_query(
        &self,
        session_id: &Uuid,
        query: &ListingQuery,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Count total sessions.
    fn count_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count total messages across all sessions.
    fn count_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
