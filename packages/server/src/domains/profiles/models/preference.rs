use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::UserId;

/// Matching preference - SQL persistence layer (1:1 with profile)
///
/// Candidates without a preference row never qualify for anyone's deck.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub user_id: UserId,
    pub game: String,
    pub partner_gender: String,
    pub session_type: String,
    pub max_distance_km: i32,
}

impl Preference {
    /// Find preference record for a user
    pub async fn find_by_user(user_id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM preferences WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert or replace a user's preference record
    pub async fn upsert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO preferences (user_id, game, partner_gender, session_type, max_distance_km)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id) DO UPDATE
             SET game = EXCLUDED.game,
                 partner_gender = EXCLUDED.partner_gender,
                 session_type = EXCLUDED.session_type,
                 max_distance_km = EXCLUDED.max_distance_km
             RETURNING *",
        )
        .bind(self.user_id)
        .bind(&self.game)
        .bind(&self.partner_gender)
        .bind(&self.session_type)
        .bind(self.max_distance_km)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

/// Activity enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Game {
    Tennis,
    Pickleball,
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Game::Tennis => write!(f, "TENNIS"),
            Game::Pickleball => write!(f, "PICKLEBALL"),
        }
    }
}

impl std::str::FromStr for Game {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TENNIS" => Ok(Game::Tennis),
            "PICKLEBALL" => Ok(Game::Pickleball),
            _ => Err(anyhow::anyhow!("Invalid game: {}", s)),
        }
    }
}

/// Partner gender filter enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerGender {
    Male,
    Female,
    Any,
}

impl std::fmt::Display for PartnerGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartnerGender::Male => write!(f, "MALE"),
            PartnerGender::Female => write!(f, "FEMALE"),
            PartnerGender::Any => write!(f, "ANY"),
        }
    }
}

impl std::str::FromStr for PartnerGender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MALE" => Ok(PartnerGender::Male),
            "FEMALE" => Ok(PartnerGender::Female),
            "ANY" => Ok(PartnerGender::Any),
            _ => Err(anyhow::anyhow!("Invalid partner gender: {}", s)),
        }
    }
}

/// Session type enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    Match,
    Private,
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::Match => write!(f, "MATCH"),
            SessionType::Private => write!(f, "PRIVATE"),
        }
    }
}

impl std::str::FromStr for SessionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MATCH" => Ok(SessionType::Match),
            "PRIVATE" => Ok(SessionType::Private),
            _ => Err(anyhow::anyhow!("Invalid session type: {}", s)),
        }
    }
}
