//! In-process consultation store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{ConsultationStore, DbError};
use crate::models::{
    ChatMessage, Consultation, ConsultationId, ConsultationStatus, NewConsultation, NewMessage,
};

#[derive(Default)]
struct Tables {
    consultations: HashMap<ConsultationId, Consultation>,
    messages: HashMap<ConsultationId, Vec<ChatMessage>>,
}

/// Store kept entirely in memory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsultationStore for MemoryStore {
    async fn create_consultation(&self, new: NewConsultation) -> Result<Consultation, DbError> {
        let consultation = Consultation {
            id: ConsultationId::new(),
            client_id: new.client_id,
            mentor_id: new.mentor_id,
            status: ConsultationStatus::Pending,
            topic: new.topic,
            scheduled_at: new.scheduled_at,
            updated_at: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        tables
            .consultations
            .insert(consultation.id, consultation.clone());
        Ok(consultation)
    }

    async fn consultation(&self, id: ConsultationId) -> Result<Consultation, DbError> {
        let tables = self.tables.read().await;
        tables
            .consultations
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::consultation_not_found(id))
    }

    async fn history(&self, id: ConsultationId) -> Result<Vec<ChatMessage>, DbError> {
        let tables = self.tables.read().await;
        if !tables.consultations.contains_key(&id) {
            return Err(DbError::consultation_not_found(id));
        }
        Ok(tables.messages.get(&id).cloned().unwrap_or_default())
    }

    async fn append_message(
        &self,
        id: ConsultationId,
        message: NewMessage,
    ) -> Result<ChatMessage, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.consultations.contains_key(&id) {
            return Err(DbError::consultation_not_found(id));
        }
        let stored = ChatMessage {
            id: Uuid::new_v4(),
            consultation_id: id,
            sender_id: message.sender_id,
            sender_role: message.sender_role,
            body: message.body.into_string(),
            created_at: Utc::now(),
        };
        tables.messages.entry(id).or_default().push(stored.clone());
        Ok(stored)
    }

    async fn update_status(
        &self,
        id: ConsultationId,
        status: ConsultationStatus,
    ) -> Result<Consultation, DbError> {
        let mut tables = self.tables.write().await;
        let consultation = tables
            .consultations
            .get_mut(&id)
            .ok_or_else(|| DbError::consultation_not_found(id))?;
        consultation.status = status;
        consultation.updated_at = Utc::now();
        Ok(consultation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientId, MessageBody, SenderRole, UserId};

    fn booking() -> NewConsultation {
        NewConsultation::new(ClientId::new(), UserId::new(), "Career switch", None).unwrap()
    }

    #[tokio::test]
    async fn history_keeps_insertion_order() {
        let store = MemoryStore::new();
        let c = store.create_consultation(booking()).await.unwrap();
        for body in ["hi", "hello", "when works?"] {
            store
                .append_message(
                    c.id,
                    NewMessage {
                        sender_id: c.mentor_id,
                        sender_role: SenderRole::Mentor,
                        body: MessageBody::new(body).unwrap(),
                    },
                )
                .await
                .unwrap();
        }
        let history = store.history(c.id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].body, "when works?");
    }

    #[tokio::test]
    async fn new_consultation_has_empty_history() {
        let store = MemoryStore::new();
        let c = store.create_consultation(booking()).await.unwrap();
        assert_eq!(c.status, ConsultationStatus::Pending);
        assert!(store.history(c.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = MemoryStore::new();
        let id = ConsultationId::new();
        assert!(matches!(
            store.history(id).await,
            Err(DbError::NotFound { resource: "consultation", .. })
        ));
        assert!(matches!(
            store.update_status(id, ConsultationStatus::Accepted).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn status_update_bumps_timestamp() {
        let store = MemoryStore::new();
        let c = store.create_consultation(booking()).await.unwrap();
        let updated = store
            .update_status(c.id, ConsultationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.status, ConsultationStatus::Accepted);
        assert!(updated.updated_at >= c.updated_at);
    }
}
