//! Application state shared across handlers

use std::sync::Arc;

use mentorlink_core::{Registry, StreamSection};
use tokio_util::sync::CancellationToken;

use crate::db::ConsultationStore;
use crate::models::{ChatEvent, ClientId, ConsultationId, ConsultationUpdate};

/// Open consultation chat streams
pub type ChatRegistry = Registry<ConsultationId, ChatEvent>;

/// Open client notification streams
pub type UpdateRegistry = Registry<ClientId, ConsultationUpdate>;

/// Shared application state
///
/// Constructed once per server (or per test) and injected into the router;
/// the registries it owns live exactly as long as it does.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn ConsultationStore>,
    chat: ChatRegistry,
    updates: UpdateRegistry,
    streams: StreamSection,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(store: Arc<dyn ConsultationStore>, streams: StreamSection) -> Self {
        Self::with_shutdown(store, streams, CancellationToken::new())
    }

    /// Use an externally owned shutdown token. Cancelling it ends every open
    /// stream.
    pub fn with_shutdown(
        store: Arc<dyn ConsultationStore>,
        streams: StreamSection,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                chat: Registry::new("consultations"),
                updates: Registry::new("clients"),
                streams,
                shutdown,
            }),
        }
    }

    pub fn store(&self) -> &dyn ConsultationStore {
        self.inner.store.as_ref()
    }

    pub fn chat(&self) -> &ChatRegistry {
        &self.inner.chat
    }

    pub fn updates(&self) -> &UpdateRegistry {
        &self.inner.updates
    }

    pub fn streams(&self) -> &StreamSection {
        &self.inner.streams
    }

    pub fn shutdown(&self) -> &CancellationToken {
        &self.inner.shutdown
    }
}
