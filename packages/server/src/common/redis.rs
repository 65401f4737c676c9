//! Redis bootstrap.
//!
//! All ephemeral state lives here under TTL: deck sessions, cache version
//! counters and cached read views. The connection manager reconnects on
//! its own, so services hold a clone and never pool connections manually.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::Client;

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager> {
    let client = Client::open(redis_url).context("Invalid REDIS_URL")?;

    client
        .get_connection_manager()
        .await
        .context("Failed to connect to Redis")
}
