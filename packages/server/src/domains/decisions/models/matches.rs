use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{MatchId, UserId};

/// Mutual match - SQL persistence layer
///
/// Rows are stored with user1_id < user2_id so either direction of a pair
/// maps to the same row. The unique pair constraint is the only
/// serialization point for concurrent double-YES submissions.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Match {
    pub id: MatchId,
    pub user1_id: UserId,
    pub user2_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Canonical (min, max) ordering for an unordered user pair.
    pub fn canonical_pair(a: UserId, b: UserId) -> (UserId, UserId) {
        (a.min(b), a.max(b))
    }

    pub async fn find_by_pair(a: UserId, b: UserId, pool: &PgPool) -> Result<Option<Self>> {
        let (user1_id, user2_id) = Self::canonical_pair(a, b);

        sqlx::query_as::<_, Self>("SELECT * FROM matches WHERE user1_id = $1 AND user2_id = $2")
            .bind(user1_id)
            .bind(user2_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Fetch the match for a pair, creating it if absent.
    ///
    /// Two callers racing on the same pair both converge on the winning
    /// row: the loser's insert hits the unique constraint (ON CONFLICT DO
    /// NOTHING returns no row) and re-reads.
    pub async fn get_or_create(a: UserId, b: UserId, pool: &PgPool) -> Result<Self> {
        if let Some(existing) = Self::find_by_pair(a, b, pool).await? {
            return Ok(existing);
        }

        let (user1_id, user2_id) = Self::canonical_pair(a, b);
        let inserted = sqlx::query_as::<_, Self>(
            "INSERT INTO matches (user1_id, user2_id)
             VALUES ($1, $2)
             ON CONFLICT (user1_id, user2_id) DO NOTHING
             RETURNING *",
        )
        .bind(user1_id)
        .bind(user2_id)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(row) => Ok(row),
            None => Self::find_by_pair(a, b, pool)
                .await?
                .context("match row missing after unique-constraint conflict"),
        }
    }
}
