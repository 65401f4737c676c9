use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::UserId;

/// One ranked candidate: who, and how far away in meters.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub target_id: UserId,
    pub distance_m: f64,
}

/// Rank deck candidates for an actor.
///
/// A candidate qualifies only when every check passes: visible, not the
/// actor, not already decided on by the actor, gender preferences satisfied
/// in both directions (ANY is a wildcard), same game and session type, and
/// the distance between the two locations within both users' radii. A
/// candidate missing a preference or location row is excluded by the inner
/// joins; an actor missing one gets an empty list, never an error.
///
/// Ordering: same-skill candidates first, then ascending distance, then
/// candidate id for a deterministic tie-break. Skill level is never a hard
/// filter.
pub async fn find_candidates(
    actor_id: UserId,
    limit: i64,
    pool: &PgPool,
) -> Result<Vec<CandidateRow>> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        WITH actor AS (
            SELECT
                up.id,
                ul.latitude,
                ul.longitude,
                up.skill_level,
                up.gender,
                p.game,
                p.partner_gender,
                p.session_type,
                p.max_distance_km
            FROM user_profiles up
            JOIN preferences p ON p.user_id = up.id
            JOIN user_locations ul ON ul.user_id = up.id
            WHERE up.id = $1
        )
        SELECT
            t.id AS target_id,
            d.distance_m
        FROM user_profiles t
        JOIN preferences tp ON tp.user_id = t.id
        JOIN user_locations tl ON tl.user_id = t.id
        CROSS JOIN actor
        CROSS JOIN LATERAL (
            SELECT haversine_distance(actor.latitude, actor.longitude,
                                      tl.latitude, tl.longitude) AS distance_m
        ) d
        WHERE t.id <> actor.id
          AND t.visible = TRUE
          AND NOT EXISTS (
              SELECT 1
              FROM user_actions ua
              WHERE ua.actor_id = actor.id AND ua.target_id = t.id
          )

          -- Actor preference: candidate gender must fit actor.partner_gender
          AND (
                COALESCE(actor.partner_gender, 'ANY') = 'ANY'
                OR t.gender = actor.partner_gender
              )

          -- Candidate preference: actor gender must fit tp.partner_gender
          AND (
                COALESCE(tp.partner_gender, 'ANY') = 'ANY'
                OR actor.gender = tp.partner_gender
              )

          -- Both must be looking for the same thing
          AND tp.game = actor.game
          AND tp.session_type = actor.session_type

          -- Distance: actor constraint
          AND d.distance_m <= actor.max_distance_km * 1000.0

          -- Distance: candidate constraint (reciprocal)
          AND d.distance_m <= COALESCE(tp.max_distance_km, actor.max_distance_km) * 1000.0
        ORDER BY
            CASE WHEN t.skill_level = actor.skill_level THEN 0 ELSE 1 END,
            d.distance_m,
            t.id
        LIMIT $2
        "#,
    )
    .bind(actor_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}
