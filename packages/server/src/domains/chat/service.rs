use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::cache::{CacheNamespace, CacheVersionService, ReadCache};
use crate::common::{ConversationId, MatchId, UserId};
use crate::domains::chat::models::Conversation;

/// Partner display fields in an inbox entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxPartner {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// One conversation in a user's inbox listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxItem {
    pub id: ConversationId,
    pub partner: InboxPartner,
    pub created_at: DateTime<Utc>,
}

/// Conversation bootstrap + inbox read path.
#[derive(Clone)]
pub struct ChatService {
    pool: PgPool,
    versions: CacheVersionService,
    cache: ReadCache,
}

impl ChatService {
    pub fn new(pool: PgPool, versions: CacheVersionService, cache: ReadCache) -> Self {
        Self {
            pool,
            versions,
            cache,
        }
    }

    /// Create a conversation for a match, idempotent per match id.
    ///
    /// The unique match_id constraint resolves concurrent creates the same
    /// way match formation does: the loser re-reads the winning row.
    /// Both participants' inbox versions are bumped on actual creation.
    pub async fn create_for_match(
        &self,
        match_id: MatchId,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<Conversation> {
        if let Some(existing) = Conversation::find_by_match_id(match_id, &self.pool).await? {
            return Ok(existing);
        }

        let conversation = match Conversation::insert_if_absent(match_id, &self.pool).await? {
            Some(created) => created,
            None => Conversation::find_by_match_id(match_id, &self.pool)
                .await?
                .context("conversation missing after unique-constraint conflict")?,
        };

        Conversation::add_participant(conversation.id, user_a, &self.pool).await?;
        Conversation::add_participant(conversation.id, user_b, &self.pool).await?;

        self.versions.bump(user_a, CacheNamespace::Inbox).await;
        self.versions.bump(user_b, CacheNamespace::Inbox).await;

        Ok(conversation)
    }

    /// Inbox listing for a user, served through the version-keyed cache.
    pub async fn list_conversations(&self, user_id: UserId) -> Result<Vec<InboxItem>> {
        let version = self
            .versions
            .get_version(user_id, CacheNamespace::Inbox)
            .await;
        let cache_key = inbox_cache_key(user_id, version);

        if let Some(cached) = self.cache.get::<Vec<InboxItem>>(&cache_key).await {
            return Ok(cached);
        }

        let rows = Conversation::inbox_for_user(user_id, &self.pool).await?;
        let items: Vec<InboxItem> = rows
            .into_iter()
            .map(|row| InboxItem {
                id: row.conversation_id,
                partner: InboxPartner {
                    id: row.partner_id,
                    name: match row.partner_name {
                        Some(name) if !name.trim().is_empty() => name,
                        _ => format!("Player {}", row.partner_id),
                    },
                    avatar_url: row.partner_avatar_url,
                },
                created_at: row.created_at,
            })
            .collect();

        self.cache.put(&cache_key, &items).await;
        Ok(items)
    }
}

fn inbox_cache_key(user_id: UserId, version: i64) -> String {
    format!("cache:inbox:{}:{}", user_id, version)
}
