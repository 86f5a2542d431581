//! Consultation endpoints
//!
//! Booking and status changes. Status changes are pushed to the client's
//! open notification streams.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::models::{
    ClientId, Consultation, ConsultationId, ConsultationStatus, ConsultationUpdate,
    NewConsultation, UserId,
};
use crate::state::AppState;

/// Book consultation request
#[derive(Deserialize)]
pub struct CreateConsultationRequest {
    pub client_id: Uuid,
    pub mentor_id: Uuid,
    pub topic: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Status change request
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ConsultationStatus,
}

fn publish_update(state: &AppState, consultation: &Consultation) {
    let update = ConsultationUpdate::from(consultation);
    match state.updates().broadcast(&consultation.client_id, &update) {
        Ok(delivery) => debug!(
            consultation_id = %consultation.id,
            client_id = %consultation.client_id,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "status update pushed"
        ),
        Err(e) => error!(consultation_id = %consultation.id, error = %e, "failed to push status update"),
    }
}

/// POST /consultations
async fn create_consultation(
    State(state): State<AppState>,
    Json(req): Json<CreateConsultationRequest>,
) -> Result<(StatusCode, Json<Consultation>), ApiError> {
    let new = NewConsultation::new(
        ClientId::from_uuid(req.client_id),
        UserId::from_uuid(req.mentor_id),
        &req.topic,
        req.scheduled_at,
    )?;

    let consultation = state.store().create_consultation(new).await?;
    info!(consultation_id = %consultation.id, client_id = %consultation.client_id, "consultation booked");
    publish_update(&state, &consultation);

    Ok((StatusCode::CREATED, Json(consultation)))
}

/// GET /consultations/{id}
async fn get_consultation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Consultation>, ApiError> {
    let consultation = state
        .store()
        .consultation(ConsultationId::from_uuid(id))
        .await?;
    Ok(Json(consultation))
}

/// PATCH /consultations/{id}/status
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Consultation>, ApiError> {
    let id = ConsultationId::from_uuid(id);
    let current = state.store().consultation(id).await?;

    if current.status == req.status {
        debug!(consultation_id = %id, status = %current.status, "status unchanged");
        return Ok(Json(current));
    }

    if !current.status.can_transition_to(req.status) {
        let message = if current.status.is_terminal() {
            format!("consultation is already {}", current.status)
        } else {
            format!(
                "cannot change consultation from {} to {}",
                current.status, req.status
            )
        };
        return Err(ApiError::Conflict { message });
    }

    let updated = state.store().update_status(id, req.status).await?;
    info!(consultation_id = %id, from = %current.status, to = %updated.status, "consultation status changed");
    publish_update(&state, &updated);

    Ok(Json(updated))
}

/// Consultation routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/consultations", post(create_consultation))
        .route("/consultations/{id}", get(get_consultation))
        .route("/consultations/{id}/status", patch(update_status))
}
