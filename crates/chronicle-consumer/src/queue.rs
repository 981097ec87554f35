//! Registration queue abstraction.

use crate::error::ConsumerResult;
use crate::message::{QueuedRegistration, RegistrationMessage};
use async_trait::async_trait;
use std::time::Duration;

/// Durable queue of registration events.
///
/// Implementations must survive a broker restart without losing published
/// messages. `declare` runs before the first `pop` and after every
/// reconnect; it must also return to the queue any deliveries that were in
/// flight when a previous consumer died.
#[async_trait]
pub trait RegistrationQueue: Send + Sync {
    /// Declares the durable queue and recovers stranded in-flight deliveries.
    async fn declare(&self) -> ConsumerResult<()>;

    /// Publishes a registration event and returns its delivery id.
    async fn publish(&self, message: &RegistrationMessage) -> ConsumerResult<String>;

    /// Pops the next delivery, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `Ok(None)` when the timeout elapses with no message.
    async fn pop(&self, timeout: Duration) -> ConsumerResult<Option<QueuedRegistration>>;

    /// Acknowledges a delivery, removing it permanently.
    async fn ack(&self, delivery: &QueuedRegistration) -> ConsumerResult<()>;

    /// Returns a delivery to the queue for another attempt.
    async fn requeue(&self, delivery: QueuedRegistration) -> ConsumerResult<()>;

    /// Parks a delivery on the dead letter queue.
    async fn dead_letter(
        &self,
        delivery: QueuedRegistration,
        reason: &str,
    ) -> ConsumerResult<()>;

    /// Number of messages waiting in the queue.
    async fn queue_length(&self) -> ConsumerResult<u64>;

    /// Health check.
    async fn health_check(&self) -> ConsumerResult<()>;
}
