use std::fmt::Display;

use redis::{AsyncCommands, Client};
use tokio::sync::mpsc;

use crate::error::{AppError, AppResult};

/// Cache keys, one variant per cached concern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Storefront metadata for a single app id
    GameDetails(String),
    /// Generated recommendations for an account
    Recommendations(i64),
    /// Vanity alias to canonical profile id mapping
    VanityAlias(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::GameDetails(app_id) => write!(f, "details:{}", app_id),
            CacheKey::Recommendations(user_id) => write!(f, "recs:{}", user_id),
            CacheKey::VanityAlias(alias) => write!(f, "vanity:{}", alias.to_lowercase()),
        }
    }
}

/// A write queued for the background writer
struct PendingWrite {
    key: String,
    json: String,
    ttl: u64,
}

/// Redis-backed cache with write-behind semantics
///
/// Reads go straight to Redis. Writes are queued to a background task, so a
/// slow or unreachable cache never delays a response; the task drains its
/// queue on shutdown.
#[derive(Clone)]
pub struct Cache {
    client: Client,
    queue: mpsc::UnboundedSender<PendingWrite>,
}

/// Handle for stopping the write-behind task
pub struct CacheWriterHandle {
    stop: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer to flush queued writes and stop
    pub async fn shutdown(self) {
        let _ = self.stop.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Opens a Redis client and spawns the write-behind task
    ///
    /// The client connects lazily, on first use; an unreachable Redis shows
    /// up per operation, not here.
    pub fn connect(redis_url: &str) -> AppResult<(Self, CacheWriterHandle)> {
        let client = Client::open(redis_url)?;

        let (queue, queue_rx) = mpsc::unbounded_channel();
        let (stop, stop_rx) = mpsc::channel(1);
        tokio::spawn(writer_task(client.clone(), queue_rx, stop_rx));

        let cache = Self { client, queue };
        let handle = CacheWriterHandle { stop };

        Ok((cache, handle))
    }

    /// Looks a key up, deserializing on a hit
    pub async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(key.to_string()).await?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| AppError::Internal(format!("Cache deserialization error: {}", e)))
    }

    /// Queues a value for the background writer and returns immediately
    ///
    /// There is no confirmation that the write lands; callers that need
    /// read-your-write semantics should not be caching in the first place.
    pub fn write_behind<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            json,
            ttl,
        };

        if self.queue.send(write).is_err() {
            tracing::error!(key = %key, "Cache writer queue closed");
        }
    }

    /// Removes a key from the cache
    ///
    /// Deleting a key that does not exist is a no-op. Used for explicit
    /// invalidation, e.g. when an account asks for its recommendations to
    /// be regenerated.
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key.to_string()).await?;
        tracing::debug!(key = %key, "Cache entry invalidated");
        Ok(())
    }
}

/// Drains the write queue until told to stop, then flushes what remains
async fn writer_task(
    client: Client,
    mut queue_rx: mpsc::UnboundedReceiver<PendingWrite>,
    mut stop_rx: mpsc::Receiver<()>,
) {
    tracing::info!("Cache writer task started");

    loop {
        tokio::select! {
            Some(write) = queue_rx.recv() => {
                if let Err(e) = flush_write(&client, write).await {
                    tracing::error!(error = %e, "Failed to write to Redis cache");
                }
            }
            _ = stop_rx.recv() => {
                while let Ok(write) = queue_rx.try_recv() {
                    if let Err(e) = flush_write(&client, write).await {
                        tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                    }
                }

                tracing::info!("Cache writer task stopped");
                break;
            }
        }
    }
}

async fn flush_write(client: &Client, write: PendingWrite) -> AppResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let _: () = conn.set_ex(write.key, write.json, write.ttl).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_game_details() {
        let key = CacheKey::GameDetails("570".to_string());
        assert_eq!(format!("{}", key), "details:570");
    }

    #[test]
    fn test_cache_key_display_recommendations() {
        let key = CacheKey::Recommendations(42);
        assert_eq!(format!("{}", key), "recs:42");
    }

    #[test]
    fn test_cache_key_display_vanity_alias_lowercase() {
        let key = CacheKey::VanityAlias("GabeN".to_string());
        assert_eq!(format!("{}", key), "vanity:gaben");
    }
}
