//! Registration message processing.

use crate::error::ConsumerResult;
use crate::message::RegistrationMessage;
use async_trait::async_trait;
use tracing::info;

/// Processing step invoked once per delivered registration event.
#[async_trait]
pub trait RegistrationHandler: Send + Sync {
    /// Processes a registration event.
    async fn handle(&self, message: &RegistrationMessage) -> ConsumerResult<()>;
}

/// Handler that records each registration in the service log.
#[derive(Debug, Default)]
pub struct LoggingRegistrationHandler;

#[async_trait]
impl RegistrationHandler for LoggingRegistrationHandler {
    async fn handle(&self, message: &RegistrationMessage) -> ConsumerResult<()> {
        info!(email = %message.email, "Processing user registration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_logging_handler_accepts_message() {
        let handler = LoggingRegistrationHandler;
        let message = RegistrationMessage::new("new.user@example.com");
        assert_ok!(handler.handle(&message).await);
    }
}
