use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Absolute TTL for cached read views, independent of the version scheme.
/// Keeps orphaned pre-bump entries bounded.
pub const READ_CACHE_TTL_SECS: u64 = 120;

/// JSON read-through cache over Redis for the deck and inbox read paths.
///
/// Consumers build keys as `cache:{view}:{user}:{params}:{version}` so a
/// version bump silently invalidates. Cache failures always degrade to
/// recomputing the view; they never fail a request.
#[derive(Clone)]
pub struct ReadCache {
    redis: ConnectionManager,
}

impl ReadCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.redis.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!(error = %err, key = %key, "dropping undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, key = %key, "cache read failed");
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, key = %key, "failed to encode cache entry");
                return;
            }
        };

        let mut conn = self.redis.clone();
        if let Err(err) = conn
            .set_ex::<_, _, ()>(key, json, READ_CACHE_TTL_SECS)
            .await
        {
            tracing::warn!(error = %err, key = %key, "cache write failed");
        }
    }
}
