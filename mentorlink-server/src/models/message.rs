//! Consultation chat messages

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::bounded_text;
use super::{ConsultationId, UserId, ValidationError};

/// Maximum message body length in characters
const MAX_BODY_CHARS: usize = 4000;

/// Which side of the consultation wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Client,
    Mentor,
}

impl SenderRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Mentor => "mentor",
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SenderRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "mentor" => Ok(Self::Mentor),
            other => Err(ValidationError::InvalidVariant {
                field: "sender_role",
                value: other.to_string(),
            }),
        }
    }
}

/// Validated message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    /// Create a message body.
    ///
    /// # Rules
    /// - Surrounding whitespace is trimmed
    /// - Must not be empty after trimming
    /// - Max 4000 characters
    ///
    /// # Example
    /// ```
    /// use mentorlink_server::models::MessageBody;
    ///
    /// assert!(MessageBody::new("See you at 3pm").is_ok());
    /// assert!(MessageBody::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("body", s, MAX_BODY_CHARS).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// A message about to be stored
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub sender_role: SenderRole,
    pub body: MessageBody,
}

/// A stored chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub consultation_id: ConsultationId,
    pub sender_id: UserId,
    pub sender_role: SenderRole,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
