//! Registration message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user registration event published by the account system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationMessage {
    /// Email address of the registered user.
    pub email: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// When the registration happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
}

impl RegistrationMessage {
    /// Creates a message carrying only the email address.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: None,
            registered_at: None,
        }
    }
}

/// Queue envelope around a registration message.
///
/// Carries the delivery identity and attempt count so the consumer can
/// acknowledge, requeue, or dead-letter a delivery without reparsing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedRegistration {
    /// Delivery identifier.
    pub id: String,
    /// How many deliveries of this message have failed.
    pub attempts: u32,
    /// The registration event itself.
    pub message: RegistrationMessage,
}

impl QueuedRegistration {
    /// Wraps a message for its first delivery.
    pub fn new(message: RegistrationMessage) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            attempts: 0,
            message,
        }
    }

    /// Records a failed delivery.
    pub fn increment_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Serializes the envelope to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an envelope from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_round_trip() {
        let message = RegistrationMessage {
            email: "new.user@example.com".to_string(),
            username: Some("newuser".to_string()),
            registered_at: Some(Utc::now()),
        };

        let json = serde_json::to_string(&message).unwrap();
        let parsed: RegistrationMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_message_requires_only_email() {
        let parsed: RegistrationMessage =
            serde_json::from_str(r#"{"email":"solo@example.com"}"#).unwrap();
        assert_eq!(parsed.email, "solo@example.com");
        assert!(parsed.username.is_none());
        assert!(parsed.registered_at.is_none());
    }

    #[test]
    fn test_message_without_email_fails_to_parse() {
        let result = serde_json::from_str::<RegistrationMessage>(r#"{"username":"ghost"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_starts_with_zero_attempts() {
        let envelope = QueuedRegistration::new(RegistrationMessage::new("a@example.com"));
        assert_eq!(envelope.attempts, 0);
        assert!(!envelope.id.is_empty());
    }

    #[test]
    fn test_envelope_increment_attempt() {
        let mut envelope = QueuedRegistration::new(RegistrationMessage::new("a@example.com"));
        envelope.increment_attempt();
        envelope.increment_attempt();
        assert_eq!(envelope.attempts, 2);
    }

    #[test]
    fn test_envelope_json_round_trip() {
        let mut envelope = QueuedRegistration::new(RegistrationMessage::new("a@example.com"));
        envelope.increment_attempt();

        let json = envelope.to_json().unwrap();
        let parsed = QueuedRegistration::from_json(&json).unwrap();
        assert_eq!(parsed.id, envelope.id);
        assert_eq!(parsed.attempts, 1);
        assert_eq!(parsed.message.email, "a@example.com");
    }

    #[test]
    fn test_envelope_ids_are_unique() {
        let a = QueuedRegistration::new(RegistrationMessage::new("a@example.com"));
        let b = QueuedRegistration::new(RegistrationMessage::new("a@example.com"));
        assert_ne!(a.id, b.id);
    }
}
