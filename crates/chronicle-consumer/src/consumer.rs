//! Long-lived registration event consumer.

use crate::error::{ConsumerError, ConsumerResult};
use crate::handler::RegistrationHandler;
use crate::message::QueuedRegistration;
use crate::queue::RegistrationQueue;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use chronicle_config::{AckPolicy, QueueConfig};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

/// Lifecycle states of the registration consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// Not connected to the broker.
    Disconnected,
    /// Establishing the broker connection and declaring the queue.
    Connecting,
    /// Waiting for deliveries.
    Subscribed,
    /// Handling a delivery.
    Processing,
    /// Shut down after a stop request.
    Stopped,
}

/// Outcome applied to one failed delivery.
#[derive(Debug, Clone, Copy)]
enum Disposition {
    Dropped,
    Requeued,
    DeadLettered,
}

/// Consumer statistics snapshot.
#[derive(Debug, Clone)]
pub struct ConsumerStats {
    /// Current lifecycle state.
    pub state: ConsumerState,
    /// Deliveries handled successfully.
    pub messages_processed: u64,
    /// Deliveries whose processing failed.
    pub messages_failed: u64,
}

/// Drains the registration queue and feeds each event to a handler.
///
/// `run` owns the whole lifecycle: it keeps retrying the broker with
/// exponential backoff instead of giving up after a failed start, and a
/// broker outage never takes down the host process. Failed deliveries are
/// dropped, requeued, or dead-lettered according to the configured
/// [`AckPolicy`].
pub struct RegistrationConsumer<Q: RegistrationQueue> {
    queue: Arc<Q>,
    handler: Arc<dyn RegistrationHandler>,
    config: QueueConfig,
    state_tx: watch::Sender<ConsumerState>,
    shutdown_tx: broadcast::Sender<()>,
    running: Arc<AtomicBool>,
    messages_processed: Arc<AtomicU64>,
    messages_failed: Arc<AtomicU64>,
}

impl<Q: RegistrationQueue> RegistrationConsumer<Q> {
    /// Creates a consumer over the given queue and handler.
    pub fn new(
        queue: Arc<Q>,
        handler: Arc<dyn RegistrationHandler>,
        config: QueueConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConsumerState::Disconnected);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            queue,
            handler,
            config,
            state_tx,
            shutdown_tx,
            running: Arc::new(AtomicBool::new(false)),
            messages_processed: Arc::new(AtomicU64::new(0)),
            messages_failed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Runs the consumer until [`stop`](Self::stop) is called.
    ///
    /// Returns an error only if the consumer is already running; broker
    /// failures are retried, not surfaced.
    pub async fn run(&self) -> ConsumerResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ConsumerError::AlreadyRunning);
        }

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut reconnect = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.config.reconnect_initial_delay())
            .with_max_interval(self.config.reconnect_max_delay())
            .with_max_elapsed_time(None)
            .build();

        loop {
            self.set_state(ConsumerState::Connecting);

            if let Err(err) = self.queue.declare().await {
                error!(error = %err, "Failed to reach registration queue broker");
                self.set_state(ConsumerState::Disconnected);

                let delay = reconnect
                    .next_backoff()
                    .unwrap_or_else(|| self.config.reconnect_max_delay());
                warn!(delay_ms = %delay.as_millis(), "Retrying broker connection");

                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        self.finish();
                        return Ok(());
                    }
                    () = tokio::time::sleep(delay) => {}
                }
                continue;
            }

            reconnect.reset();
            self.set_state(ConsumerState::Subscribed);
            info!(queue = %self.config.queue_name, "Waiting for messages in queue");

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        self.finish();
                        return Ok(());
                    }
                    popped = self.queue.pop(self.config.pop_timeout()) => {
                        match popped {
                            Ok(Some(delivery)) => {
                                self.set_state(ConsumerState::Processing);
                                self.process_delivery(delivery).await;
                                self.set_state(ConsumerState::Subscribed);
                            }
                            Ok(None) => {
                                // Poll timeout elapsed with no message.
                            }
                            Err(err) => {
                                error!(error = %err, "Receiving from registration queue failed");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Handles one delivery and applies the configured failure disposition.
    async fn process_delivery(&self, delivery: QueuedRegistration) {
        debug!(
            delivery_id = %delivery.id,
            email = %delivery.message.email,
            "Received user registration message"
        );

        // Under the at-most-once policy the delivery is acknowledged before
        // processing, so a handler failure cannot trigger a redelivery.
        if self.config.ack_policy == AckPolicy::Ack {
            self.ack_delivery(&delivery).await;
        }

        match self.handler.handle(&delivery.message).await {
            Ok(()) => {
                if self.config.ack_policy != AckPolicy::Ack {
                    self.ack_delivery(&delivery).await;
                }
                self.messages_processed.fetch_add(1, Ordering::Relaxed);
                debug!(delivery_id = %delivery.id, "Registration processed");
            }
            Err(err) => {
                self.messages_failed.fetch_add(1, Ordering::Relaxed);
                let delivery_id = delivery.id.clone();
                let disposition = self.dispose_failed(delivery, &err).await;
                warn!(
                    delivery_id = %delivery_id,
                    error = %err,
                    disposition = ?disposition,
                    "Registration processing failed"
                );
            }
        }
    }

    async fn ack_delivery(&self, delivery: &QueuedRegistration) {
        if let Err(err) = self.queue.ack(delivery).await {
            warn!(delivery_id = %delivery.id, error = %err, "Acknowledge failed");
        }
    }

    /// Applies the failure disposition for the configured ack policy.
    async fn dispose_failed(
        &self,
        delivery: QueuedRegistration,
        err: &ConsumerError,
    ) -> Disposition {
        match self.config.ack_policy {
            AckPolicy::Ack => Disposition::Dropped,
            AckPolicy::Requeue => {
                self.requeue_delivery(delivery).await;
                Disposition::Requeued
            }
            AckPolicy::DeadLetter => {
                let exhausted = delivery.attempts + 1 >= self.config.max_attempts;
                if exhausted || err.should_dead_letter() {
                    let reason = err.to_string();
                    if let Err(dlq_err) = self.queue.dead_letter(delivery, &reason).await {
                        error!(error = %dlq_err, "Dead letter failed");
                    }
                    Disposition::DeadLettered
                } else {
                    self.requeue_delivery(delivery).await;
                    Disposition::Requeued
                }
            }
        }
    }

    async fn requeue_delivery(&self, delivery: QueuedRegistration) {
        if let Err(err) = self.queue.requeue(delivery).await {
            error!(error = %err, "Requeue failed");
        }
    }

    /// Requests the consumer to stop after the current delivery.
    pub fn stop(&self) {
        info!("Stopping registration consumer...");
        let _ = self.shutdown_tx.send(());
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConsumerState {
        *self.state_tx.borrow()
    }

    /// Watches lifecycle state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConsumerState> {
        self.state_tx.subscribe()
    }

    /// Check if the consumer is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> ConsumerStats {
        ConsumerStats {
            state: self.state(),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            messages_failed: self.messages_failed.load(Ordering::Relaxed),
        }
    }

    fn set_state(&self, state: ConsumerState) {
        self.state_tx.send_replace(state);
    }

    fn finish(&self) {
        self.set_state(ConsumerState::Stopped);
        self.running.store(false, Ordering::SeqCst);
        info!(
            processed = self.messages_processed.load(Ordering::Relaxed),
            failed = self.messages_failed.load(Ordering::Relaxed),
            "Registration consumer stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RegistrationMessage;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_test::assert_ok;

    struct MemoryQueue {
        pending: Mutex<VecDeque<QueuedRegistration>>,
        acked: Mutex<Vec<QueuedRegistration>>,
        dead: Mutex<Vec<QueuedRegistration>>,
        declare_calls: AtomicU32,
        declare_failures: u32,
    }

    impl MemoryQueue {
        fn new() -> Self {
            Self::failing_declares(0)
        }

        fn failing_declares(declare_failures: u32) -> Self {
            Self {
                pending: Mutex::new(VecDeque::new()),
                acked: Mutex::new(Vec::new()),
                dead: Mutex::new(Vec::new()),
                declare_calls: AtomicU32::new(0),
                declare_failures,
            }
        }

        fn seed(&self, email: &str) -> String {
            let envelope = QueuedRegistration::new(RegistrationMessage::new(email));
            let id = envelope.id.clone();
            self.pending.lock().unwrap().push_back(envelope);
            id
        }

        fn pending_len(&self) -> usize {
            self.pending.lock().unwrap().len()
        }

        fn acked_len(&self) -> usize {
            self.acked.lock().unwrap().len()
        }

        fn dead_len(&self) -> usize {
            self.dead.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RegistrationQueue for MemoryQueue {
        async fn declare(&self) -> ConsumerResult<()> {
            let calls = self.declare_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if calls <= self.declare_failures {
                return Err(ConsumerError::Connection("broker unreachable".into()));
            }
            Ok(())
        }

        async fn publish(&self, message: &RegistrationMessage) -> ConsumerResult<String> {
            let envelope = QueuedRegistration::new(message.clone());
            let id = envelope.id.clone();
            self.pending.lock().unwrap().push_back(envelope);
            Ok(id)
        }

        async fn pop(&self, timeout: Duration) -> ConsumerResult<Option<QueuedRegistration>> {
            let delivery = self.pending.lock().unwrap().pop_front();
            if delivery.is_some() {
                return Ok(delivery);
            }

            tokio::time::sleep(timeout).await;
            Ok(self.pending.lock().unwrap().pop_front())
        }

        async fn ack(&self, delivery: &QueuedRegistration) -> ConsumerResult<()> {
            self.acked.lock().unwrap().push(delivery.clone());
            Ok(())
        }

        async fn requeue(&self, mut delivery: QueuedRegistration) -> ConsumerResult<()> {
            delivery.increment_attempt();
            self.pending.lock().unwrap().push_back(delivery);
            Ok(())
        }

        async fn dead_letter(
            &self,
            delivery: QueuedRegistration,
            _reason: &str,
        ) -> ConsumerResult<()> {
            self.dead.lock().unwrap().push(delivery);
            Ok(())
        }

        async fn queue_length(&self) -> ConsumerResult<u64> {
            Ok(self.pending_len() as u64)
        }

        async fn health_check(&self) -> ConsumerResult<()> {
            Ok(())
        }
    }

    struct CountingHandler {
        handled: AtomicU32,
    }

    impl CountingHandler {
        fn new() -> Self {
            Self {
                handled: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl RegistrationHandler for CountingHandler {
        async fn handle(&self, _message: &RegistrationMessage) -> ConsumerResult<()> {
            self.handled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailOnceHandler {
        calls: AtomicU32,
    }

    impl FailOnceHandler {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl RegistrationHandler for FailOnceHandler {
        async fn handle(&self, _message: &RegistrationMessage) -> ConsumerResult<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ConsumerError::Processing("transient failure".into()));
            }
            Ok(())
        }
    }

    struct AlwaysFailingHandler;

    #[async_trait]
    impl RegistrationHandler for AlwaysFailingHandler {
        async fn handle(&self, _message: &RegistrationMessage) -> ConsumerResult<()> {
            Err(ConsumerError::Processing("handler rejected message".into()))
        }
    }

    fn test_config(ack_policy: AckPolicy) -> QueueConfig {
        QueueConfig {
            ack_policy,
            max_attempts: 2,
            pop_timeout_secs: 1,
            reconnect_initial_delay_ms: 10,
            reconnect_max_delay_secs: 1,
            ..QueueConfig::default()
        }
    }

    fn spawn_consumer(
        queue: Arc<MemoryQueue>,
        handler: Arc<dyn RegistrationHandler>,
        ack_policy: AckPolicy,
    ) -> (
        Arc<RegistrationConsumer<MemoryQueue>>,
        tokio::task::JoinHandle<ConsumerResult<()>>,
    ) {
        let consumer = Arc::new(RegistrationConsumer::new(
            queue,
            handler,
            test_config(ack_policy),
        ));
        let task = {
            let consumer = consumer.clone();
            tokio::spawn(async move { consumer.run().await })
        };
        (consumer, task)
    }

    async fn wait_until<F: Fn() -> bool>(condition: F) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_processes_message_and_acks() {
        let queue = Arc::new(MemoryQueue::new());
        let seeded_id = queue.seed("new.user@example.com");

        let handler = Arc::new(CountingHandler::new());
        let (consumer, task) =
            spawn_consumer(queue.clone(), handler.clone(), AckPolicy::DeadLetter);

        wait_until(|| consumer.stats().messages_processed == 1).await;
        assert_eq!(handler.handled.load(Ordering::SeqCst), 1);
        assert_eq!(queue.acked_len(), 1);
        assert_eq!(queue.acked.lock().unwrap()[0].id, seeded_id);
        assert_eq!(queue.pending_len(), 0);

        consumer.stop();
        assert_ok!(task.await.unwrap());
        assert_eq!(consumer.state(), ConsumerState::Stopped);
        assert!(!consumer.is_running());
    }

    #[tokio::test]
    async fn test_requeue_policy_retries_failed_delivery() {
        let queue = Arc::new(MemoryQueue::new());
        queue.seed("retry@example.com");

        let (consumer, task) = spawn_consumer(
            queue.clone(),
            Arc::new(FailOnceHandler::new()),
            AckPolicy::Requeue,
        );

        wait_until(|| consumer.stats().messages_processed == 1).await;

        let stats = consumer.stats();
        assert_eq!(stats.messages_failed, 1);
        assert_eq!(stats.messages_processed, 1);

        // The acknowledged delivery carries the failed attempt.
        assert_eq!(queue.acked.lock().unwrap()[0].attempts, 1);
        assert_eq!(queue.dead_len(), 0);

        consumer.stop();
        assert_ok!(task.await.unwrap());
    }

    #[tokio::test]
    async fn test_dead_letter_policy_parks_message_after_max_attempts() {
        let queue = Arc::new(MemoryQueue::new());
        queue.seed("doomed@example.com");

        let (consumer, task) = spawn_consumer(
            queue.clone(),
            Arc::new(AlwaysFailingHandler),
            AckPolicy::DeadLetter,
        );

        wait_until(|| queue.dead_len() == 1).await;

        // Two deliveries with max_attempts = 2: one requeue, then the dead letter.
        assert_eq!(consumer.stats().messages_failed, 2);
        assert_eq!(queue.dead.lock().unwrap()[0].attempts, 1);
        assert_eq!(queue.pending_len(), 0);
        assert_eq!(queue.acked_len(), 0);

        consumer.stop();
        assert_ok!(task.await.unwrap());
    }

    #[tokio::test]
    async fn test_ack_policy_drops_failed_delivery() {
        let queue = Arc::new(MemoryQueue::new());
        queue.seed("dropped@example.com");

        let (consumer, task) = spawn_consumer(
            queue.clone(),
            Arc::new(AlwaysFailingHandler),
            AckPolicy::Ack,
        );

        wait_until(|| consumer.stats().messages_failed == 1).await;

        // Acknowledged up front, never redelivered.
        assert_eq!(queue.acked_len(), 1);
        assert_eq!(queue.pending_len(), 0);
        assert_eq!(queue.dead_len(), 0);

        consumer.stop();
        assert_ok!(task.await.unwrap());
    }

    #[tokio::test]
    async fn test_broker_outage_retries_until_connected() {
        let queue = Arc::new(MemoryQueue::failing_declares(2));
        queue.seed("late@example.com");

        let (consumer, task) = spawn_consumer(
            queue.clone(),
            Arc::new(CountingHandler::new()),
            AckPolicy::DeadLetter,
        );

        wait_until(|| consumer.stats().messages_processed == 1).await;
        assert!(queue.declare_calls.load(Ordering::SeqCst) >= 3);

        consumer.stop();
        assert_ok!(task.await.unwrap());
    }

    #[tokio::test]
    async fn test_stop_while_disconnected_returns_cleanly() {
        let queue = Arc::new(MemoryQueue::failing_declares(u32::MAX));

        let (consumer, task) = spawn_consumer(
            queue.clone(),
            Arc::new(CountingHandler::new()),
            AckPolicy::DeadLetter,
        );

        wait_until(|| queue.declare_calls.load(Ordering::SeqCst) >= 1).await;

        consumer.stop();
        assert_ok!(task.await.unwrap());
        assert_eq!(consumer.state(), ConsumerState::Stopped);
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let queue = Arc::new(MemoryQueue::new());

        let (consumer, task) = spawn_consumer(
            queue,
            Arc::new(CountingHandler::new()),
            AckPolicy::DeadLetter,
        );

        let mut state_rx = consumer.subscribe_state();
        state_rx
            .wait_for(|state| *state == ConsumerState::Subscribed)
            .await
            .expect("consumer dropped");

        let second = consumer.run().await;
        assert!(matches!(second, Err(ConsumerError::AlreadyRunning)));

        consumer.stop();
        assert_ok!(task.await.unwrap());
    }

    #[tokio::test]
    async fn test_reaches_subscribed_then_stops() {
        let queue = Arc::new(MemoryQueue::new());

        let (consumer, task) = spawn_consumer(
            queue,
            Arc::new(CountingHandler::new()),
            AckPolicy::DeadLetter,
        );

        let mut state_rx = consumer.subscribe_state();
        state_rx
            .wait_for(|state| *state == ConsumerState::Subscribed)
            .await
            .expect("consumer dropped");

        consumer.stop();
        assert_ok!(task.await.unwrap());
        assert_eq!(consumer.state(), ConsumerState::Stopped);
    }
}
