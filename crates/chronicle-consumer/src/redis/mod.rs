//! Redis-backed registration queue implementation.

mod queue;

pub use queue::RedisRegistrationQueue;

use crate::error::{ConsumerError, ConsumerResult};
use chronicle_config::QueueConfig;
use deadpool_redis::{Config, Pool, Runtime};
use tracing::{info, warn};

/// Create a Redis connection pool for the registration queue.
///
/// Fails only on invalid configuration. An unreachable broker is reported
/// as a warning; connecting is retried by the consumer reconnect loop.
pub async fn create_pool(config: &QueueConfig) -> ConsumerResult<Pool> {
    info!("Creating Redis connection pool for registration queue...");

    let cfg = Config::from_url(&config.url);

    let pool = cfg
        .builder()
        .map_err(|e| ConsumerError::Configuration(format!("Invalid broker config: {}", e)))?
        .max_size(config.pool_size as usize)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| ConsumerError::Configuration(format!("Failed to create pool: {}", e)))?;

    // Probe the broker once so an outage shows up in the startup log
    match pool.get().await {
        Ok(mut conn) => match redis::cmd("PING").query_async::<String>(&mut *conn).await {
            Ok(_) => info!("Redis connection pool created successfully"),
            Err(e) => warn!("Queue broker is not responding yet: {}", e),
        },
        Err(e) => warn!("Queue broker is not reachable yet: {}", e),
    }

    Ok(pool)
}

/// Redis key builder for the registration queue.
pub struct RedisKeys {
    prefix: String,
}

impl RedisKeys {
    /// Create a new key builder with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Pending deliveries (list, newest at the head).
    pub fn queue(&self) -> String {
        format!("{}:queue", self.prefix)
    }

    /// In-flight deliveries (hash: delivery id -> envelope).
    pub fn inflight(&self) -> String {
        format!("{}:inflight", self.prefix)
    }

    /// Dead letter queue (list).
    pub fn dlq(&self) -> String {
        format!("{}:dlq", self.prefix)
    }
}

impl Default for RedisKeys {
    fn default() -> Self {
        Self::new("user_registration_queue")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_keys() {
        let keys = RedisKeys::new("test");

        assert_eq!(keys.queue(), "test:queue");
        assert_eq!(keys.inflight(), "test:inflight");
        assert_eq!(keys.dlq(), "test:dlq");
    }

    #[test]
    fn test_default_prefix_is_queue_name() {
        let keys = RedisKeys::default();
        assert_eq!(keys.queue(), "user_registration_queue:queue");
    }
}
