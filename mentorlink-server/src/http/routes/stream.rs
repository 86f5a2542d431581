//! Streaming endpoints
//!
//! GET /consultations/{id}/stream - chat history pushes for one consultation
//! GET /clients/{id}/stream       - consultation status pushes for one client
//! GET /streams                   - open connection counts
//!
//! Each request registers one channel and holds the response open until the
//! client disconnects, the server shuts down, or the entry is removed.

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
    routing::get,
    Json, Router,
};
use futures::stream::{self, Stream};
use mentorlink_core::{Channel, Frame, MpscChannel, Registry, RegistrationGuard, StreamSection};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::models::{ChatEvent, ClientId, ConsultationId};
use crate::state::AppState;

/// Connection counts for one registry
#[derive(Debug, Serialize)]
pub struct RegistryStats {
    pub connections: usize,
    pub keys: usize,
}

impl<K, P> From<&Registry<K, P>> for RegistryStats
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn from(registry: &Registry<K, P>) -> Self {
        Self {
            connections: registry.len(),
            keys: registry.keys().len(),
        }
    }
}

/// GET /streams response
#[derive(Debug, Serialize)]
pub struct StreamStats {
    pub consultations: RegistryStats,
    pub clients: RegistryStats,
}

/// Turn a registered connection's receiver into an SSE body stream.
///
/// The guard lives in the stream state, so the registry entry is removed
/// whenever the stream ends or is dropped.
pub(crate) fn event_stream<K, P>(
    rx: mpsc::Receiver<Frame>,
    guard: RegistrationGuard<K, P>,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    P: 'static,
{
    stream::unfold((rx, guard, cancel), |(mut rx, guard, cancel)| async move {
        let frame = tokio::select! {
            _ = cancel.cancelled() => None,
            frame = rx.recv() => frame,
        };
        frame.map(|f| (Ok(Event::default().data(f.data())), (rx, guard, cancel)))
    })
}

fn sse<S>(stream: S, streams: &StreamSection) -> Sse<KeepAliveStream<S>>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream).keep_alive(KeepAlive::new().interval(streams.keep_alive()))
}

/// GET /consultations/{id}/stream
///
/// The first event is the current chat history. If it cannot be loaded the
/// stream still opens and waits for the next broadcast.
async fn consultation_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<KeepAliveStream<impl Stream<Item = Result<Event, Infallible>>>>, ApiError> {
    let id = ConsultationId::from_uuid(id);
    state.store().consultation(id).await?;

    let (channel, rx) = MpscChannel::pair(state.streams().channel_capacity);
    match state.store().history(id).await {
        Ok(messages) => {
            let event = ChatEvent::History {
                consultation_id: id,
                messages,
            };
            match Frame::json(&event) {
                Ok(frame) => {
                    if let Err(e) = channel.send(frame) {
                        warn!(consultation_id = %id, error = %e, "failed to queue initial history");
                    }
                }
                Err(e) => warn!(consultation_id = %id, error = %e, "failed to serialize history"),
            }
        }
        Err(e) => warn!(consultation_id = %id, error = %e, "failed to load history for new stream"),
    }

    let registration = state.chat().register(channel, id);
    info!(conn_id = registration.id(), consultation_id = %id, "consultation stream opened");
    let guard = state.chat().guard(registration);

    let events = event_stream(rx, guard, state.shutdown().child_token());
    Ok(sse(events, state.streams()))
}

/// GET /clients/{id}/stream
async fn client_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Sse<KeepAliveStream<impl Stream<Item = Result<Event, Infallible>>>> {
    let id = ClientId::from_uuid(id);
    let (channel, rx) = MpscChannel::pair(state.streams().channel_capacity);

    let registration = state.updates().register(channel, id);
    info!(conn_id = registration.id(), client_id = %id, "client stream opened");
    let guard = state.updates().guard(registration);

    let events = event_stream(rx, guard, state.shutdown().child_token());
    sse(events, state.streams())
}

/// GET /streams
async fn stream_stats(State(state): State<AppState>) -> Json<StreamStats> {
    Json(StreamStats {
        consultations: RegistryStats::from(state.chat()),
        clients: RegistryStats::from(state.updates()),
    })
}

/// Streaming routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/consultations/{id}/stream", get(consultation_stream))
        .route("/clients/{id}/stream", get(client_stream))
        .route("/streams", get(stream_stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::{json, Value};

    type Rooms = Registry<String, Value>;

    #[tokio::test]
    async fn dropping_stream_unregisters() {
        let registry = Rooms::new("test");
        let (channel, rx) = MpscChannel::pair(4);
        let guard = registry.register_guarded(channel, "room".to_string());
        let events = event_stream(rx, guard, CancellationToken::new());
        assert_eq!(registry.len(), 1);

        drop(events);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn cancellation_ends_stream_and_unregisters() {
        let registry = Rooms::new("test");
        let (channel, rx) = MpscChannel::pair(4);
        let guard = registry.register_guarded(channel, "room".to_string());
        let cancel = CancellationToken::new();
        let mut events = Box::pin(event_stream(rx, guard, cancel.child_token()));

        registry
            .broadcast(&"room".to_string(), &json!({"n": 1}))
            .unwrap();
        assert!(events.next().await.is_some());

        cancel.cancel();
        assert!(events.next().await.is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn server_side_unregister_ends_stream() {
        let registry = Rooms::new("test");
        let (channel, rx) = MpscChannel::pair(4);
        let handle = registry.register(channel, "room".to_string());
        let guard = registry.guard(handle.clone());
        let mut events = Box::pin(event_stream(rx, guard, CancellationToken::new()));

        assert!(registry.unregister(&handle));
        assert!(events.next().await.is_none());
    }
}
