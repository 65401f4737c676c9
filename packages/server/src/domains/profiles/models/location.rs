use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::UserId;

/// Coarse user location (1:1 with profile).
///
/// Latitude/longitude pairs feed the haversine distance checks in ranking;
/// geocoding and update rate limiting happen upstream.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserLocation {
    pub user_id: UserId,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

impl UserLocation {
    /// Find location record for a user
    pub async fn find_by_user(user_id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_locations WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert or replace a user's location
    pub async fn upsert(user_id: UserId, latitude: f64, longitude: f64, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO user_locations (user_id, latitude, longitude, updated_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (user_id) DO UPDATE
             SET latitude = EXCLUDED.latitude,
                 longitude = EXCLUDED.longitude,
                 updated_at = NOW()
             RETURNING *",
        )
        .bind(user_id)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
