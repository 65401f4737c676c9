use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::UserId;

/// User profile - SQL persistence layer
///
/// Display fields may be absent until onboarding completes; the ranking
/// query only serves `visible` profiles.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserProfile {
    pub id: UserId,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub description: Option<String>,
    pub skill_level: Option<String>,
    pub avatar_url: Option<String>,
    pub visible: bool,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Find profile by ID
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Batch lookup for deck card / match summary display fields.
    pub async fn find_by_ids(ids: &[UserId], pool: &PgPool) -> Result<Vec<Self>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Self>("SELECT * FROM user_profiles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert new profile
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO user_profiles (
                name,
                age,
                gender,
                description,
                skill_level,
                avatar_url,
                visible,
                email
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(&self.name)
        .bind(self.age)
        .bind(&self.gender)
        .bind(&self.description)
        .bind(&self.skill_level)
        .bind(&self.avatar_url)
        .bind(self.visible)
        .bind(&self.email)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Display name with a fallback for profiles that never set one.
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Player {}", self.id),
        }
    }
}

/// Profile gender enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "MALE"),
            Gender::Female => write!(f, "FEMALE"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            _ => Err(anyhow::anyhow!("Invalid gender: {}", s)),
        }
    }
}

/// Skill level enum
///
/// Never hard-filtered in ranking; used only for same-level-first ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    UpperIntermediate,
    CollegePlayer,
    Pro,
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillLevel::Beginner => write!(f, "BEGINNER"),
            SkillLevel::Intermediate => write!(f, "INTERMEDIATE"),
            SkillLevel::UpperIntermediate => write!(f, "UPPER_INTERMEDIATE"),
            SkillLevel::CollegePlayer => write!(f, "COLLEGE_PLAYER"),
            SkillLevel::Pro => write!(f, "PRO"),
        }
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BEGINNER" => Ok(SkillLevel::Beginner),
            "INTERMEDIATE" => Ok(SkillLevel::Intermediate),
            "UPPER_INTERMEDIATE" => Ok(SkillLevel::UpperIntermediate),
            "COLLEGE_PLAYER" => Ok(SkillLevel::CollegePlayer),
            "PRO" => Ok(SkillLevel::Pro),
            _ => Err(anyhow::anyhow!("Invalid skill level: {}", s)),
        }
    }
}
