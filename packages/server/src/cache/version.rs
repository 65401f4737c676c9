use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::common::UserId;

/// Counter lifetime from the first bump. Not a sliding window: later bumps
/// leave the expiry alone, so an abandoned counter self-cleans and a reset
/// is indistinguishable from a cold cache miss.
const VERSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Which read view a counter invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheNamespace {
    Deck,
    Inbox,
}

impl CacheNamespace {
    fn as_str(self) -> &'static str {
        match self {
            CacheNamespace::Deck => "deck",
            CacheNamespace::Inbox => "inbox",
        }
    }
}

/// Per-user monotonic version counters backed by Redis INCR.
///
/// Counters are shared across service instances; the atomic increment is
/// the only write primitive, so there is no read-modify-write race.
#[derive(Clone)]
pub struct CacheVersionService {
    redis: ConnectionManager,
}

impl CacheVersionService {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(user_id: UserId, namespace: CacheNamespace) -> String {
        format!("cache:{}:version:{}", namespace.as_str(), user_id)
    }

    /// Current version for a user, 0 when no bump has happened yet.
    ///
    /// Redis trouble reads as 0: the consumer then derives a cold cache
    /// key and recomputes, which is always safe.
    pub async fn get_version(&self, user_id: UserId, namespace: CacheNamespace) -> i64 {
        let key = Self::key(user_id, namespace);
        let mut conn = self.redis.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(value)) => value.parse().unwrap_or(0),
            Ok(None) => 0,
            Err(err) => {
                tracing::warn!(error = %err, key = %key, "failed to read cache version");
                0
            }
        }
    }

    /// Atomically increment a user's version counter.
    ///
    /// The first increment sets the key expiry; subsequent increments do
    /// not reset it.
    pub async fn bump(&self, user_id: UserId, namespace: CacheNamespace) {
        let key = Self::key(user_id, namespace);
        let mut conn = self.redis.clone();

        match conn.incr::<_, _, i64>(&key, 1).await {
            Ok(1) => {
                if let Err(err) = conn.expire::<_, ()>(&key, VERSION_TTL_SECS).await {
                    tracing::warn!(error = %err, key = %key, "failed to set version expiry");
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, key = %key, "failed to bump cache version");
            }
        }
    }
}
