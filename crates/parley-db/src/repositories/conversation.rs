//! PostgreSQL implementation of ConversationRepository
//!
//! Sub-entity updates (participants, read cursors, last-message summary) are
//! single UPDATE statements, atomic per row. Concurrent writers to the same
//! conversation resolve by row-level locking inside Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::{
    Conversation, ConversationRepository, DomainError, LastMessageSummary, Participant,
    RepoResult, Snowflake,
};

use crate::mappers::kind_to_str;
use crate::models::ConversationRow;

use super::error::{map_db_error, map_unique_violation};

const SELECT_COLUMNS: &str = "id, kind, name, description, picture, direct_key, participants, \
     last_message, last_message_at, is_encrypted, settings, created_at, updated_at";

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    /// Create a new PgConversationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// JSONB containment probe for "user is a participant"
    fn participant_probe(user_id: Snowflake) -> Json<serde_json::Value> {
        Json(serde_json::json!([{ "user_id": user_id.to_string() }]))
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_direct(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM conversations WHERE direct_key = $1"
        ))
        .bind(Conversation::direct_key_for(a, b))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn list_for_user(
        &self,
        user_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Conversation>> {
        let results = sqlx::query_as::<_, ConversationRow>(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM conversations
            WHERE participants @> $1
            ORDER BY last_message_at DESC NULLS LAST, id DESC
            OFFSET $2 LIMIT $3
            "
        ))
        .bind(Self::participant_probe(user_id))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Conversation::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_for_user(&self, user_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM conversations WHERE participants @> $1",
        )
        .bind(Self::participant_probe(user_id))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, conversation))]
    async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO conversations
                (id, kind, name, description, picture, direct_key, participants,
                 is_encrypted, settings, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(conversation.id.into_inner())
        .bind(kind_to_str(conversation.kind))
        .bind(&conversation.name)
        .bind(&conversation.description)
        .bind(&conversation.picture)
        .bind(conversation.direct_key())
        .bind(Json(&conversation.participants))
        .bind(conversation.is_encrypted)
        .bind(Json(&conversation.settings))
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::Conflict("direct conversation already exists".to_string())
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, conversation))]
    async fn update_profile(&self, conversation: &Conversation) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE conversations
            SET name = $2, description = $3, picture = $4, settings = $5, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(conversation.id.into_inner())
        .bind(&conversation.name)
        .bind(&conversation.description)
        .bind(&conversation.picture)
        .bind(Json(&conversation.settings))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ConversationNotFound(conversation.id));
        }

        Ok(())
    }

    #[instrument(skip(self, participant))]
    async fn add_participant(
        &self,
        conversation_id: Snowflake,
        participant: &Participant,
    ) -> RepoResult<bool> {
        // Append-if-absent in one statement; the existence probe and the
        // append see the same row version.
        let result = sqlx::query(
            r"
            UPDATE conversations
            SET participants = participants || $2, updated_at = now()
            WHERE id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM jsonb_array_elements(participants) p
                  WHERE p->>'user_id' = $3
              )
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(Json(serde_json::json!([participant])))
        .bind(participant.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn remove_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE conversations
            SET participants = (
                    SELECT COALESCE(jsonb_agg(p), '[]'::jsonb)
                    FROM jsonb_array_elements(participants) p
                    WHERE p->>'user_id' <> $2
                ),
                updated_at = now()
            WHERE id = $1 AND participants @> $3
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.to_string())
        .bind(Self::participant_probe(user_id))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn update_last_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE conversations
            SET participants = (
                    SELECT jsonb_agg(
                        CASE WHEN p->>'user_id' = $2
                             THEN jsonb_set(p, '{last_read_at}', $3)
                             ELSE p
                        END)
                    FROM jsonb_array_elements(participants) p
                )
            WHERE id = $1 AND participants @> $4
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.to_string())
        .bind(Json(at))
        .bind(Self::participant_probe(user_id))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, summary))]
    async fn set_last_message(
        &self,
        conversation_id: Snowflake,
        summary: Option<&LastMessageSummary>,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE conversations
            SET last_message = $2, last_message_at = $3, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(summary.map(Json))
        .bind(summary.map(|s| s.timestamp))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}
