//! Payloads pushed over streaming connections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChatMessage, Consultation, ConsultationId, ConsultationStatus};

/// Pushed on `/consultations/{id}/stream`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Full chat history, oldest first
    History {
        consultation_id: ConsultationId,
        messages: Vec<ChatMessage>,
    },
}

/// Pushed on `/clients/{id}/stream`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationUpdate {
    pub consultation_id: ConsultationId,
    pub status: ConsultationStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Consultation> for ConsultationUpdate {
    fn from(c: &Consultation) -> Self {
        Self {
            consultation_id: c.id,
            status: c.status,
            scheduled_at: c.scheduled_at,
            updated_at: c.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_event_is_tagged() {
        let event = ChatEvent::History {
            consultation_id: ConsultationId::new(),
            messages: vec![],
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "history");
        assert!(value["messages"].as_array().unwrap().is_empty());
    }
}
