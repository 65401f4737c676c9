use std::collections::HashMap;

use anyhow::Result;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::{CacheNamespace, CacheVersionService, ReadCache};
use crate::common::UserId;
use crate::domains::deck::session::DeckSessionStore;
use crate::domains::deck::{filter, ranking};
use crate::domains::profiles::UserProfile;

/// How many cards a deck holds unless the caller asks for fewer.
pub const DEFAULT_DECK_SIZE: i64 = 20;

/// Hard ceiling on requested deck size.
pub const MAX_DECK_SIZE: i64 = 100;

/// Lifetime of an issued deck token.
pub const DECK_TTL_MINUTES: i64 = 15;

const DEFAULT_AVATAR_URL: &str = "/placeholder-avatar.png";

/// One card handed to the client. Carries only the synthetic card id and
/// display fields; the real target id stays inside the deck session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckCard {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub photo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// An issued deck: the opaque token plus ordered cards.
#[derive(Debug, Clone, Serialize)]
pub struct Deck {
    pub deck_token: String,
    pub cards: Vec<DeckCard>,
    pub ttl_ms: i64,
}

/// Assembles decks: rank, filter, resolve display fields, mint cards,
/// bind them in a session.
#[derive(Clone)]
pub struct DeckService {
    pool: PgPool,
    sessions: DeckSessionStore,
    versions: CacheVersionService,
    cache: ReadCache,
}

impl DeckService {
    pub fn new(
        pool: PgPool,
        sessions: DeckSessionStore,
        versions: CacheVersionService,
        cache: ReadCache,
    ) -> Self {
        Self {
            pool,
            sessions,
            versions,
            cache,
        }
    }

    pub fn sessions(&self) -> &DeckSessionStore {
        &self.sessions
    }

    /// Build and issue a deck for an actor.
    ///
    /// The ranked candidate list is served through the version-keyed read
    /// cache; cards and the session are always minted fresh so every deck
    /// response redeems against its own token. An actor with no location
    /// or preference record gets an empty deck, not an error.
    pub async fn build_deck(&self, actor_id: UserId, size: i64) -> Result<Deck> {
        let size = size.clamp(1, MAX_DECK_SIZE);

        let ranked = self.ranked_candidates(actor_id, size).await?;
        let filtered = filter::filter(actor_id, ranked, &self.pool).await?;
        if filtered.removed_swiped > 0 || filtered.removed_duplicates > 0 {
            tracing::debug!(
                actor_id,
                removed_swiped = filtered.removed_swiped,
                removed_duplicates = filtered.removed_duplicates,
                "deck candidates filtered"
            );
        }

        let ids: Vec<UserId> = filtered.candidates.iter().map(|c| c.target_id).collect();
        let profiles: HashMap<UserId, UserProfile> = UserProfile::find_by_ids(&ids, &self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut card_to_user: HashMap<String, UserId> = HashMap::new();
        let mut cards = Vec::with_capacity(filtered.candidates.len());
        for candidate in &filtered.candidates {
            let Some(profile) = profiles.get(&candidate.target_id) else {
                continue;
            };

            let card_id = Uuid::new_v4().to_string();
            card_to_user.insert(card_id.clone(), candidate.target_id);

            cards.push(DeckCard {
                id: card_id,
                name: profile.display_name(),
                age: profile.age,
                skill_level: profile.skill_level.clone(),
                distance_km: Some(round_km(candidate.distance_m)),
                photo: profile
                    .avatar_url
                    .clone()
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
                bio: profile
                    .description
                    .clone()
                    .filter(|bio| !bio.trim().is_empty()),
            });
        }

        let ttl = Duration::minutes(DECK_TTL_MINUTES);
        let expires_at = Utc::now() + ttl;
        let deck_token = self
            .sessions
            .create(actor_id, card_to_user, expires_at)
            .await?;

        Ok(Deck {
            deck_token,
            cards,
            ttl_ms: ttl.num_milliseconds(),
        })
    }

    /// Ranked candidates through the version-keyed cache: any deck-version
    /// bump (a decision, a preference change) strands the old entry.
    async fn ranked_candidates(
        &self,
        actor_id: UserId,
        size: i64,
    ) -> Result<Vec<ranking::CandidateRow>> {
        let version = self
            .versions
            .get_version(actor_id, CacheNamespace::Deck)
            .await;
        let cache_key = deck_cache_key(actor_id, size, version);

        if let Some(cached) = self.cache.get::<Vec<ranking::CandidateRow>>(&cache_key).await {
            return Ok(cached);
        }

        let rows = ranking::find_candidates(actor_id, size, &self.pool).await?;
        self.cache.put(&cache_key, &rows).await;
        Ok(rows)
    }
}

fn deck_cache_key(actor_id: UserId, size: i64, version: i64) -> String {
    format!("cache:deck:{}:{}:{}", actor_id, size, version)
}

fn round_km(distance_m: f64) -> f64 {
    (distance_m / 1000.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_cache_key_changes_with_version_and_size() {
        let base = deck_cache_key(1, 20, 0);
        assert_eq!(base, "cache:deck:1:20:0");
        assert_ne!(base, deck_cache_key(1, 20, 1));
        assert_ne!(base, deck_cache_key(1, 10, 0));
    }

    #[test]
    fn distance_rounds_to_one_decimal_km() {
        assert_eq!(round_km(8000.0), 8.0);
        assert_eq!(round_km(8149.0), 8.1);
        assert_eq!(round_km(440.0), 0.4);
    }
}
