//! Consultation records and status lifecycle

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::bounded_text;
use super::{ClientId, ConsultationId, UserId, ValidationError};

/// Maximum topic length in characters
const MAX_TOPIC_CHARS: usize = 200;

/// Consultation status
///
/// `pending` may become `accepted`, `rejected` or `cancelled`;
/// `accepted` may become `completed` or `cancelled`. The rest are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl ConsultationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// Whether `next` may follow `self`. Re-applying the current status is
    /// allowed.
    pub fn can_transition_to(&self, next: Self) -> bool {
        use ConsultationStatus::*;

        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Accepted, Completed)
                | (Accepted, Cancelled)
        )
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsultationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// A consultation between a client and a mentor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: ConsultationId,
    pub client_id: ClientId,
    pub mentor_id: UserId,
    pub status: ConsultationStatus,
    pub topic: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A consultation about to be booked
#[derive(Debug, Clone)]
pub struct NewConsultation {
    pub client_id: ClientId,
    pub mentor_id: UserId,
    pub topic: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl NewConsultation {
    /// Validate the topic (trimmed, non-empty, at most 200 characters).
    pub fn new(
        client_id: ClientId,
        mentor_id: UserId,
        topic: &str,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            client_id,
            mentor_id,
            topic: bounded_text("topic", topic, MAX_TOPIC_CHARS)?,
            scheduled_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConsultationStatus::*;

    #[test]
    fn terminal_states_are_final() {
        for from in [Rejected, Completed, Cancelled] {
            for to in [Pending, Accepted] {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn happy_path() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Accepted.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn same_status_is_allowed() {
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn parse_roundtrips_names() {
        for s in [Pending, Accepted, Rejected, Completed, Cancelled] {
            assert_eq!(s.as_str().parse::<ConsultationStatus>().unwrap(), s);
        }
        assert!("done".parse::<ConsultationStatus>().is_err());
    }

    #[test]
    fn blank_topic_rejected() {
        let err = NewConsultation::new(ClientId::new(), UserId::new(), "  ", None).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "topic" });
    }
}
