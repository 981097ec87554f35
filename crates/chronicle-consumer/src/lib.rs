//! Chronicle Consumer - Registration Event Consumer
//!
//! A Redis-backed consumer that drains the durable user registration queue
//! and invokes a processing handler per delivery, decoupled from HTTP
//! request handling. Failed deliveries are dropped, requeued, or
//! dead-lettered according to a configurable acknowledgment policy, and a
//! broker outage is retried with exponential backoff instead of taking the
//! host process down.
//!
//! # Architecture
//!
//! ```text
//! Producer ──▶ registration queue (list)
//!                     │
//!                     ▼  pop (moves delivery in flight)
//!             RegistrationConsumer
//!   Disconnected → Connecting → Subscribed → Processing
//!                     │
//!         ┌───────────┼────────────────┐
//!         ▼           ▼                ▼
//!       ack        requeue        dead letter
//!    (success)  (failed, retry)  (failed, parked)
//! ```

pub mod consumer;
pub mod error;
pub mod handler;
pub mod message;
pub mod queue;
pub mod redis;

pub use consumer::{ConsumerState, ConsumerStats, RegistrationConsumer};
pub use error::{ConsumerError, ConsumerResult};
pub use handler::{LoggingRegistrationHandler, RegistrationHandler};
pub use message::{QueuedRegistration, RegistrationMessage};
pub use queue::RegistrationQueue;
