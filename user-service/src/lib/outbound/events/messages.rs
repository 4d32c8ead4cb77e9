use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::user::events::AuthEvent;

/// Serializable envelope for login and signup events.
///
/// Infrastructure representation for event publishing (Kafka, etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthEventMessage {
    pub event_id: String,
    pub event_type: String,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

impl From<&AuthEvent> for AuthEventMessage {
    fn from(event: &AuthEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            event_type: event.kind.as_str().to_string(),
            email: event.email.clone(),
            occurred_at: event.occurred_at,
        }
    }
}
