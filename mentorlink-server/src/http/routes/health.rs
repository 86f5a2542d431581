//! GET /health
//!
//! Reports `draining` with 503 once shutdown has begun.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = if state.shutdown().is_cancelled() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ok")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
    };
    (code, Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use mentorlink_core::StreamSection;

    use crate::db::MemoryStore;

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), StreamSection::default())
    }

    #[tokio::test]
    async fn healthy_until_shutdown() {
        let state = state();
        let (code, Json(body)) = health(State(state.clone())).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "ok");

        state.shutdown().cancel();
        let (code, Json(body)) = health(State(state)).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "draining");
    }
}
