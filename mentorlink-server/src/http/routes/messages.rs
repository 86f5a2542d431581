//! Consultation chat endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::models::{ChatEvent, ChatMessage, ConsultationId, MessageBody, NewMessage, SenderRole, UserId};
use crate::state::AppState;

/// Create message request
#[derive(Deserialize)]
pub struct CreateMessageRequest {
    pub sender_id: Uuid,
    pub sender_role: SenderRole,
    pub body: String,
}

/// Push the consultation's full history to its open streams.
///
/// Best effort: a failed history fetch is logged and nothing is pushed;
/// clients catch up on their next fetch.
pub(crate) async fn publish_history(state: &AppState, id: ConsultationId) {
    let messages = match state.store().history(id).await {
        Ok(messages) => messages,
        Err(e) => {
            warn!(consultation_id = %id, error = %e, "failed to load history, skipping broadcast");
            return;
        }
    };

    let event = ChatEvent::History {
        consultation_id: id,
        messages,
    };
    match state.chat().broadcast(&id, &event) {
        Ok(delivery) => debug!(
            consultation_id = %id,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "history pushed"
        ),
        Err(e) => error!(consultation_id = %id, error = %e, "failed to push history"),
    }
}

/// GET /consultations/{id}/messages - chat history, oldest first
async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state.store().history(ConsultationId::from_uuid(id)).await?;
    Ok(Json(messages))
}

/// POST /consultations/{id}/messages - store a message and push history
async fn create_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let id = ConsultationId::from_uuid(id);
    let body = MessageBody::new(&req.body)?;

    let message = state
        .store()
        .append_message(
            id,
            NewMessage {
                sender_id: UserId::from_uuid(req.sender_id),
                sender_role: req.sender_role,
                body,
            },
        )
        .await?;

    publish_history(&state, id).await;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Message routes
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/consultations/{id}/messages",
        get(list_messages).post(create_message),
    )
}
