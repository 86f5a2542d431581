//! Consultation store trait

use async_trait::async_trait;

use crate::models::{
    ChatMessage, Consultation, ConsultationId, ConsultationStatus, NewConsultation, NewMessage,
};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("invalid stored value for {field}: {value}")]
    Decode { field: &'static str, value: String },
}

impl DbError {
    pub(crate) fn consultation_not_found(id: ConsultationId) -> Self {
        Self::NotFound {
            resource: "consultation",
            id: id.to_string(),
        }
    }
}

/// Persistence the push layer depends on.
///
/// The database is the source of truth; pushed events are derived from
/// what these methods return.
#[async_trait]
pub trait ConsultationStore: Send + Sync + 'static {
    async fn create_consultation(&self, new: NewConsultation) -> Result<Consultation, DbError>;

    async fn consultation(&self, id: ConsultationId) -> Result<Consultation, DbError>;

    /// Chat history, oldest first. Unknown consultation is `NotFound`.
    async fn history(&self, id: ConsultationId) -> Result<Vec<ChatMessage>, DbError>;

    async fn append_message(
        &self,
        id: ConsultationId,
        message: NewMessage,
    ) -> Result<ChatMessage, DbError>;

    /// Set the status and bump `updated_at`. Transition rules are checked by
    /// the caller.
    async fn update_status(
        &self,
        id: ConsultationId,
        status: ConsultationStatus,
    ) -> Result<Consultation, DbError>;
}
