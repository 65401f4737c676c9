use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{ConversationId, MatchId, UserId};

/// Conversation - SQL persistence layer
///
/// Exactly one conversation per match (unique match_id).
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Conversation {
    pub id: ConversationId,
    pub match_id: MatchId,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub async fn find_by_match_id(match_id: MatchId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM conversations WHERE match_id = $1")
            .bind(match_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a conversation for a match unless one exists.
    /// Returns None when a concurrent creator won the unique constraint.
    pub async fn insert_if_absent(match_id: MatchId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO conversations (match_id)
             VALUES ($1)
             ON CONFLICT (match_id) DO NOTHING
             RETURNING *",
        )
        .bind(match_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn add_participant(
        conversation_id: ConversationId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO conversation_participants (conversation_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (conversation_id, user_id) DO NOTHING",
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Inbox rows for a user: their conversations with the partner's
    /// display fields, newest first.
    pub async fn inbox_for_user(user_id: UserId, pool: &PgPool) -> Result<Vec<InboxRow>> {
        sqlx::query_as::<_, InboxRow>(
            "SELECT c.id AS conversation_id,
                    c.created_at,
                    other.user_id AS partner_id,
                    p.name AS partner_name,
                    p.age AS partner_age,
                    p.avatar_url AS partner_avatar_url
             FROM conversations c
             JOIN conversation_participants me
               ON me.conversation_id = c.id AND me.user_id = $1
             JOIN conversation_participants other
               ON other.conversation_id = c.id AND other.user_id <> $1
             LEFT JOIN user_profiles p ON p.id = other.user_id
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

/// One inbox listing row as read from the database.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct InboxRow {
    pub conversation_id: ConversationId,
    pub created_at: DateTime<Utc>,
    pub partner_id: UserId,
    pub partner_name: Option<String>,
    pub partner_age: Option<i32>,
    pub partner_avatar_url: Option<String>,
}
