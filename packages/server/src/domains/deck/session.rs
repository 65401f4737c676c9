use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::UserId;

/// Ephemeral binding of opaque card ids to real candidate ids for one
/// viewing session. Never a source of truth for identity: the decision
/// path still verifies ownership and expiry before trusting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSession {
    pub token: String,
    pub actor_id: UserId,
    pub card_to_user: HashMap<String, UserId>,
    pub expires_at: DateTime<Utc>,
}

/// Redis-backed deck session store. Keys expire via the store's own TTL;
/// reads additionally honor the embedded expires_at to cover clock skew
/// between the two.
#[derive(Clone)]
pub struct DeckSessionStore {
    redis: ConnectionManager,
}

impl DeckSessionStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(token: &str) -> String {
        format!("deck:session:{}", token)
    }

    /// Store a new session and return its unguessable token.
    ///
    /// Storage or serialization failures are fatal to deck issuance; there
    /// is no deck without a session to redeem it against.
    pub async fn create(
        &self,
        actor_id: UserId,
        card_to_user: HashMap<String, UserId>,
        expires_at: DateTime<Utc>,
    ) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let session = DeckSession {
            token: token.clone(),
            actor_id,
            card_to_user,
            expires_at,
        };

        let json = serde_json::to_string(&session).context("failed to encode deck session")?;
        let ttl_secs = ttl_seconds(expires_at, Utc::now());

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(Self::key(&token), json, ttl_secs)
            .await
            .context("failed to store deck session")?;

        Ok(token)
    }

    /// Look up a session by token.
    ///
    /// Fails closed: a missing key, an undecodable value and an expired
    /// embedded timestamp all read as not-found. Stale entries the store
    /// has not yet evicted are deleted on sight.
    pub async fn get(&self, token: &str) -> Option<DeckSession> {
        let key = Self::key(token);
        let mut conn = self.redis.clone();

        let json: String = match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "deck session read failed");
                return None;
            }
        };

        let session: DeckSession = match serde_json::from_str(&json) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "dropping undecodable deck session");
                return None;
            }
        };

        if session.expires_at < Utc::now() {
            // Storage-level TTL should have reclaimed this already.
            let _ = conn.del::<_, ()>(&key).await;
            return None;
        }

        Some(session)
    }
}

/// TTL for the stored session, clamped to at least one second so an
/// already-past expires_at never produces a zero or negative TTL.
fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (expires_at - now).num_seconds().max(1) as u64
}
