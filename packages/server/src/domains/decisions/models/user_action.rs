use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ActionId, UserId};

/// Recorded decision - SQL persistence layer
///
/// One row per ordered (actor, target) pair, immutable once created.
/// Rows are never updated or deleted; they back both replay detection and
/// deck exclusion.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserAction {
    pub id: ActionId,
    pub actor_id: UserId,
    pub target_id: UserId,
    pub decision: String,
    pub position: Option<i32>,
    pub at_utc: DateTime<Utc>,
    pub idempotency_key: Option<String>,
}

impl UserAction {
    /// Persist a new decision row.
    ///
    /// Uniqueness on (actor_id, target_id) and on idempotency_key is
    /// enforced by the schema; violations propagate to the caller.
    pub async fn insert(
        actor_id: UserId,
        target_id: UserId,
        decision: Decision,
        at_utc: DateTime<Utc>,
        idempotency_key: Option<&str>,
        position: Option<i32>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO user_actions (actor_id, target_id, decision, position, at_utc, idempotency_key)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(actor_id)
        .bind(target_id)
        .bind(decision.to_string())
        .bind(position)
        .bind(at_utc)
        .bind(idempotency_key)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_idempotency_key(key: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_actions WHERE idempotency_key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn exists_for_pair(actor_id: UserId, target_id: UserId, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM user_actions WHERE actor_id = $1 AND target_id = $2
             )",
        )
        .bind(actor_id)
        .bind(target_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Whether the ordered pair has a recorded YES (used for the reciprocal
    /// check during match formation).
    pub async fn exists_yes(actor_id: UserId, target_id: UserId, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM user_actions
                WHERE actor_id = $1 AND target_id = $2 AND decision = $3
             )",
        )
        .bind(actor_id)
        .bind(target_id)
        .bind(Decision::Yes.to_string())
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Target ids among `candidate_ids` the actor has already decided on.
    /// Backs the defensive re-check in the deck candidate filter.
    pub async fn decided_targets_among(
        actor_id: UserId,
        candidate_ids: &[UserId],
        pool: &PgPool,
    ) -> Result<Vec<UserId>> {
        if candidate_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, UserId>(
            "SELECT target_id FROM user_actions WHERE actor_id = $1 AND target_id = ANY($2)",
        )
        .bind(actor_id)
        .bind(candidate_ids)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

/// Decision enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Yes,
    No,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Yes => write!(f, "YES"),
            Decision::No => write!(f, "NO"),
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "YES" => Ok(Decision::Yes),
            "NO" => Ok(Decision::No),
            _ => Err(anyhow::anyhow!("Invalid decision: {}", s)),
        }
    }
}
