//! PostgreSQL implementation of MessageRepository
//!
//! Reaction and read-receipt collections are JSONB objects keyed by user id;
//! each mutation is one UPDATE statement, so concurrent reactions by
//! different users never lose each other's writes and the first-write-wins
//! receipt rule holds under races.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::{
    DomainError, Message, MessageRepository, Reaction, RepoResult, Snowflake,
};

use crate::mappers::content_type_to_str;
use crate::models::MessageRow;

use super::error::map_db_error;

const SELECT_COLUMNS: &str = "id, conversation_id, sender_id, content, content_type, metadata, \
     reply_to, reactions, read_by, is_edited, is_deleted, deleted_at, created_at, updated_at";

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO messages
                (id, conversation_id, sender_id, content, content_type, metadata,
                 reply_to, reactions, read_by, is_edited, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.conversation_id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(&message.content)
        .bind(content_type_to_str(message.content_type))
        .bind(message.metadata.as_ref().map(Json))
        .bind(message.reply_to.map(Snowflake::into_inner))
        .bind(Json(&message.reactions))
        .bind(Json(&message.read_by))
        .bind(message.is_edited)
        .bind(message.is_deleted)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_page(
        &self,
        conversation_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageRow>(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM messages
            WHERE conversation_id = $1 AND NOT is_deleted
            ORDER BY id DESC
            OFFSET $2 LIMIT $3
            "
        ))
        .bind(conversation_id.into_inner())
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, conversation_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = $1 AND NOT is_deleted",
        )
        .bind(conversation_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn latest_visible(&self, conversation_id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageRow>(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM messages
            WHERE conversation_id = $1 AND NOT is_deleted
            ORDER BY id DESC
            LIMIT 1
            "
        ))
        .bind(conversation_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, content))]
    async fn update_content(&self, id: Snowflake, content: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET content = $2, is_edited = TRUE, updated_at = now()
            WHERE id = $1 AND NOT is_deleted
            ",
        )
        .bind(id.into_inner())
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        // Idempotent: re-deleting keeps the original deleted_at.
        sqlx::query(
            r"
            UPDATE messages
            SET is_deleted = TRUE, deleted_at = $2, updated_at = $2
            WHERE id = $1 AND NOT is_deleted
            ",
        )
        .bind(id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, reaction))]
    async fn upsert_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        reaction: &Reaction,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET reactions = jsonb_set(reactions, ARRAY[$2], $3, true), updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(message_id.into_inner())
        .bind(user_id.to_string())
        .bind(Json(reaction))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageNotFound(message_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET reactions = reactions - $2, updated_at = now()
            WHERE id = $1 AND jsonb_exists(reactions, $2)
            ",
        )
        .bind(message_id.into_inner())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        // First write wins: the guard and the insert are one statement.
        let result = sqlx::query(
            r"
            UPDATE messages
            SET read_by = jsonb_set(read_by, ARRAY[$2], $3, true)
            WHERE id = $1 AND NOT jsonb_exists(read_by, $2)
            ",
        )
        .bind(message_id.into_inner())
        .bind(user_id.to_string())
        .bind(Json(at))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(conversation_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
