//! Redis registration queue implementation.

use super::RedisKeys;
use crate::error::ConsumerResult;
use crate::message::{QueuedRegistration, RegistrationMessage};
use crate::queue::RegistrationQueue;
use async_trait::async_trait;
use chronicle_config::QueueConfig;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis-backed registration queue.
///
/// Pending deliveries live on a list. `pop` moves each delivery into an
/// in-flight hash so an interrupted consumer can recover it on the next
/// `declare`, and `ack` removes it for good. Dead-lettered deliveries are
/// parked on a separate list for inspection.
pub struct RedisRegistrationQueue {
    pool: Pool,
    keys: RedisKeys,
}

impl RedisRegistrationQueue {
    /// Create a new Redis registration queue.
    pub fn new(pool: Pool, config: &QueueConfig) -> Self {
        let keys = RedisKeys::new(&config.queue_name);
        Self { pool, keys }
    }

    /// Get a connection from the pool.
    async fn conn(&self) -> ConsumerResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Moves deliveries stranded in the in-flight hash back onto the queue.
    async fn recover_inflight(&self) -> ConsumerResult<u64> {
        let mut conn = self.conn().await?;

        let stranded: HashMap<String, String> = conn.hgetall(&self.keys.inflight()).await?;

        let mut recovered = 0u64;
        for (id, envelope_json) in stranded {
            let _: () = redis::pipe()
                .hdel(&self.keys.inflight(), &id)
                .lpush(&self.keys.queue(), &envelope_json)
                .query_async(&mut *conn)
                .await?;

            recovered += 1;
            debug!(delivery_id = %id, "Recovered in-flight delivery");
        }

        if recovered > 0 {
            info!(count = recovered, "Recovered stranded deliveries");
        }

        Ok(recovered)
    }
}

#[async_trait]
impl RegistrationQueue for RedisRegistrationQueue {
    async fn declare(&self) -> ConsumerResult<()> {
        // A Redis list is durable as long as the server persists it, so
        // declaring amounts to verifying the connection and recovering
        // deliveries stranded by a previous consumer.
        self.health_check().await?;
        self.recover_inflight().await?;
        Ok(())
    }

    async fn publish(&self, message: &RegistrationMessage) -> ConsumerResult<String> {
        let envelope = QueuedRegistration::new(message.clone());
        let envelope_json = envelope.to_json()?;

        let mut conn = self.conn().await?;
        let _: () = conn.lpush(&self.keys.queue(), &envelope_json).await?;

        debug!(
            delivery_id = %envelope.id,
            email = %message.email,
            "Published registration event"
        );

        Ok(envelope.id)
    }

    async fn pop(&self, timeout: Duration) -> ConsumerResult<Option<QueuedRegistration>> {
        let mut conn = self.conn().await?;

        let popped: Option<(String, String)> = conn
            .brpop(&self.keys.queue(), timeout.as_secs_f64())
            .await?;

        let Some((_, envelope_json)) = popped else {
            return Ok(None);
        };

        let envelope = match QueuedRegistration::from_json(&envelope_json) {
            Ok(envelope) => envelope,
            Err(err) => {
                // A payload that cannot be decoded will never succeed.
                warn!(error = %err, "Unparseable delivery moved to dead letter queue");
                let _: () = conn.lpush(&self.keys.dlq(), &envelope_json).await?;
                return Ok(None);
            }
        };

        let _: () = conn
            .hset(&self.keys.inflight(), &envelope.id, &envelope_json)
            .await?;

        Ok(Some(envelope))
    }

    async fn ack(&self, delivery: &QueuedRegistration) -> ConsumerResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn.hdel(&self.keys.inflight(), &delivery.id).await?;

        debug!(delivery_id = %delivery.id, "Acknowledged delivery");
        Ok(())
    }

    async fn requeue(&self, mut delivery: QueuedRegistration) -> ConsumerResult<()> {
        delivery.increment_attempt();
        let envelope_json = delivery.to_json()?;

        let mut conn = self.conn().await?;
        let _: () = redis::pipe()
            .hdel(&self.keys.inflight(), &delivery.id)
            .lpush(&self.keys.queue(), &envelope_json)
            .query_async(&mut *conn)
            .await?;

        debug!(
            delivery_id = %delivery.id,
            attempts = delivery.attempts,
            "Requeued delivery"
        );

        Ok(())
    }

    async fn dead_letter(
        &self,
        delivery: QueuedRegistration,
        reason: &str,
    ) -> ConsumerResult<()> {
        let envelope_json = delivery.to_json()?;

        let mut conn = self.conn().await?;
        let _: () = redis::pipe()
            .hdel(&self.keys.inflight(), &delivery.id)
            .lpush(&self.keys.dlq(), &envelope_json)
            .query_async(&mut *conn)
            .await?;

        warn!(
            delivery_id = %delivery.id,
            reason = %reason,
            "Dead-lettered delivery"
        );

        Ok(())
    }

    async fn queue_length(&self) -> ConsumerResult<u64> {
        let mut conn = self.conn().await?;
        Ok(conn.llen(&self.keys.queue()).await?)
    }

    async fn health_check(&self) -> ConsumerResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING").query_async::<String>(&mut *conn).await?;
        Ok(())
    }
}
