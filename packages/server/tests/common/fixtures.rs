//! Test fixtures for creating test data.
//!
//! Fixtures use the model methods directly. Every player gets a unique
//! email, so tests can share one database; deck tests additionally place
//! their players in a private [`TestArea`] so concurrent tests never
//! appear in each other's decks.

use anyhow::Result;
use chrono::Utc;
use courtmatch_core::common::UserId;
use courtmatch_core::domains::profiles::{Preference, UserLocation, UserProfile};
use sqlx::PgPool;
use uuid::Uuid;

/// Geographically isolated neighborhood for one test.
///
/// Areas sit two degrees of longitude apart (~219 km at this latitude),
/// far beyond any preference radius, so players from different areas can
/// never satisfy each other's distance constraints.
pub struct TestArea {
    pub lat: f64,
    pub lng: f64,
}

impl TestArea {
    pub fn new(offset: u32) -> Self {
        Self {
            lat: 10.0,
            lng: -170.0 + f64::from(offset) * 2.0,
        }
    }

    /// A point roughly `km` kilometers north of the area center.
    pub fn km_north(&self, km: f64) -> (f64, f64) {
        // One degree of latitude is ~111.195 km
        (self.lat + km / 111.195, self.lng)
    }
}

/// Everything needed to stand up a rankable player.
pub struct PlayerSpec {
    pub gender: &'static str,
    pub skill_level: &'static str,
    pub visible: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub game: &'static str,
    pub partner_gender: &'static str,
    pub session_type: &'static str,
    pub max_distance_km: i32,
    /// Set false to create a profile with no preference row.
    pub with_preference: bool,
    /// Set false to create a profile with no location row.
    pub with_location: bool,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        let area = TestArea::new(0);
        Self {
            gender: "MALE",
            skill_level: "INTERMEDIATE",
            visible: true,
            latitude: area.lat,
            longitude: area.lng,
            game: "TENNIS",
            partner_gender: "ANY",
            session_type: "MATCH",
            max_distance_km: 20,
            with_preference: true,
            with_location: true,
        }
    }
}

impl PlayerSpec {
    /// Default spec placed at the center of `area`.
    pub fn at(area: &TestArea) -> Self {
        Self {
            latitude: area.lat,
            longitude: area.lng,
            ..Self::default()
        }
    }
}

/// Create a profile plus (by default) its preference and location rows.
pub async fn create_player(name: &str, spec: PlayerSpec, pool: &PgPool) -> Result<UserId> {
    let profile = UserProfile {
        id: 0, // assigned by the database
        name: Some(name.to_string()),
        age: Some(30),
        gender: Some(spec.gender.to_string()),
        description: None,
        skill_level: Some(spec.skill_level.to_string()),
        avatar_url: None,
        visible: spec.visible,
        email: format!("{}-{}@test.example", name.to_lowercase(), Uuid::new_v4()),
        created_at: Utc::now(),
    }
    .insert(pool)
    .await?;

    if spec.with_preference {
        Preference {
            user_id: profile.id,
            game: spec.game.to_string(),
            partner_gender: spec.partner_gender.to_string(),
            session_type: spec.session_type.to_string(),
            max_distance_km: spec.max_distance_km,
        }
        .upsert(pool)
        .await?;
    }

    if spec.with_location {
        UserLocation::upsert(profile.id, spec.latitude, spec.longitude, pool).await?;
    }

    Ok(profile.id)
}

/// Count persisted decision rows for an ordered pair.
pub async fn action_count(actor_id: UserId, target_id: UserId, pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM user_actions WHERE actor_id = $1 AND target_id = $2",
    )
    .bind(actor_id)
    .bind(target_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Count match rows for an unordered pair (any orientation).
pub async fn match_count(a: UserId, b: UserId, pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM matches
         WHERE (user1_id = $1 AND user2_id = $2) OR (user1_id = $2 AND user2_id = $1)",
    )
    .bind(a)
    .bind(b)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Count conversations attached to a match.
pub async fn conversation_count(match_id: i64, pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM conversations WHERE match_id = $1")
        .bind(match_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
}
