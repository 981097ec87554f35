//! Consumer error types.

use thiserror::Error;

/// Result type for consumer operations.
pub type ConsumerResult<T> = Result<T, ConsumerError>;

/// Registration consumer errors.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Broker connection failed.
    #[error("Broker connection failed: {0}")]
    Connection(String),

    /// Message payload could not be parsed.
    #[error("Message parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// Message processing failed.
    #[error("Message processing failed: {0}")]
    Processing(String),

    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis pool error.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Consumer is already running.
    #[error("Consumer is already running")]
    AlreadyRunning,
}

impl ConsumerError {
    /// Returns true if redelivering the message could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConsumerError::Connection(_)
                | ConsumerError::Processing(_)
                | ConsumerError::Redis(_)
                | ConsumerError::Pool(_)
        )
    }

    /// Returns true if the message can never succeed and should be
    /// dead-lettered without another delivery.
    pub fn should_dead_letter(&self) -> bool {
        matches!(
            self,
            ConsumerError::Parse(_) | ConsumerError::Configuration(_)
        )
    }
}

impl From<chronicle_core::ChronicleError> for ConsumerError {
    fn from(err: chronicle_core::ChronicleError) -> Self {
        ConsumerError::Processing(err.to_string())
    }
}
