//! Keyed broadcast registry
//!
//! Tracks open push channels under a correlation key (a consultation id, a
//! client id, ...) and fans a payload out to every channel registered under
//! a given key.
//!
//! - Registration always succeeds; several entries may share a key
//! - Unregistering is idempotent
//! - Broadcast serializes once, then writes each matching channel
//!   independently: one failing channel is logged and skipped
//! - Writes happen outside the lock, on a snapshot of the matching entries

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::channel::{Channel, MpscChannel};
use crate::error::RegistryError;
use crate::sse::Frame;

/// Process-unique id assigned at registration
pub type ConnectionId = u64;

// Shared by every registry so ids never collide across registries.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`Registry::register`], used to remove the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration<K> {
    id: ConnectionId,
    key: K,
}

impl<K> Registration<K> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn key(&self) -> &K {
        &self.key
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

impl Delivery {
    /// Number of channels the broadcast targeted.
    pub fn recipients(&self) -> usize {
        self.delivered + self.failed
    }
}

struct Entry<K, C> {
    key: K,
    channel: Arc<C>,
}

struct Inner<K, C> {
    name: &'static str,
    entries: Mutex<HashMap<ConnectionId, Entry<K, C>>>,
}

/// Registry of open push channels, keyed by `K`, carrying payloads of type `P`.
///
/// Cloning is cheap and clones share the same entries.
pub struct Registry<K, P, C = MpscChannel> {
    inner: Arc<Inner<K, C>>,
    _payload: PhantomData<fn(&P)>,
}

impl<K, P, C> Clone for Registry<K, P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _payload: PhantomData,
        }
    }
}

impl<K, P, C> fmt::Debug for Registry<K, P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.inner.name)
            .field("len", &self.lock().len())
            .finish()
    }
}

impl<K, P, C> Registry<K, P, C> {
    /// Create an empty registry. `name` tags its log lines.
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                entries: Mutex::new(HashMap::new()),
            }),
            _payload: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Number of open connections across all keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries stay consistent under a panicking holder: every mutation is a
    // single insert or remove.
    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Entry<K, C>>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, P, C> Registry<K, P, C>
where
    K: Eq + Hash + Clone + fmt::Debug,
    C: Channel,
{
    /// Add a channel under `key`.
    pub fn register(&self, channel: C, key: K) -> Registration<K> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let entry = Entry {
            key: key.clone(),
            channel: Arc::new(channel),
        };
        let total = {
            let mut entries = self.lock();
            entries.insert(id, entry);
            entries.len()
        };
        debug!(registry = self.inner.name, conn_id = id, ?key, total, "connection registered");
        Registration { id, key }
    }

    /// Register and return a guard that unregisters on drop.
    pub fn register_guarded(&self, channel: C, key: K) -> RegistrationGuard<K, P, C> {
        let registration = self.register(channel, key);
        self.guard(registration)
    }

    /// Tie an existing registration to a drop guard.
    pub fn guard(&self, registration: Registration<K>) -> RegistrationGuard<K, P, C> {
        RegistrationGuard {
            registry: self.clone(),
            registration: Some(registration),
        }
    }

    /// Remove an entry. Returns `false` if it was already gone.
    ///
    /// Dropping the entry drops its channel, which ends the stream reading
    /// from the other side.
    pub fn unregister(&self, registration: &Registration<K>) -> bool {
        let removed = self.lock().remove(&registration.id);
        match removed {
            Some(_) => {
                debug!(
                    registry = self.inner.name,
                    conn_id = registration.id,
                    key = ?registration.key,
                    "connection unregistered"
                );
                true
            }
            None => false,
        }
    }

    /// Number of open connections registered under `key`.
    pub fn connections_for(&self, key: &K) -> usize {
        self.lock().values().filter(|e| &e.key == key).count()
    }

    /// Distinct keys with at least one open connection.
    pub fn keys(&self) -> Vec<K> {
        let entries = self.lock();
        let unique: HashSet<&K> = entries.values().map(|e| &e.key).collect();
        unique.into_iter().cloned().collect()
    }

    /// Send an already-built frame to every channel under `key`.
    pub fn broadcast_frame(&self, key: &K, frame: &Frame) -> Delivery {
        let targets: Vec<(ConnectionId, Arc<C>)> = self
            .lock()
            .iter()
            .filter(|(_, e)| &e.key == key)
            .map(|(id, e)| (*id, Arc::clone(&e.channel)))
            .collect();

        let mut delivery = Delivery::default();
        for (conn_id, channel) in targets {
            match channel.send(frame.clone()) {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    delivery.failed += 1;
                    warn!(
                        registry = self.inner.name,
                        conn_id,
                        ?key,
                        error = %e,
                        "failed to push frame to connection"
                    );
                }
            }
        }

        debug!(
            registry = self.inner.name,
            ?key,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "broadcast complete"
        );
        delivery
    }
}

impl<K, P, C> Registry<K, P, C>
where
    K: Eq + Hash + Clone + fmt::Debug,
    P: Serialize,
    C: Channel,
{
    /// Serialize `payload` and push it to every channel under `key`.
    ///
    /// Fails only when the payload cannot be serialized, in which case no
    /// channel is written.
    pub fn broadcast(&self, key: &K, payload: &P) -> Result<Delivery, RegistryError> {
        let frame = Frame::json(payload)?;
        Ok(self.broadcast_frame(key, &frame))
    }
}

/// Unregisters its entry when dropped.
///
/// Held by the response stream of a streaming connection so that every way
/// the stream can end (client gone, shutdown, handler error) removes it.
pub struct RegistrationGuard<K, P, C = MpscChannel>
where
    K: Eq + Hash + Clone + fmt::Debug,
    C: Channel,
{
    registry: Registry<K, P, C>,
    registration: Option<Registration<K>>,
}

impl<K, P, C> RegistrationGuard<K, P, C>
where
    K: Eq + Hash + Clone + fmt::Debug,
    C: Channel,
{
    pub fn registration(&self) -> Option<&Registration<K>> {
        self.registration.as_ref()
    }

    /// Unregister now instead of at drop. Returns `false` if the entry was
    /// already removed elsewhere.
    pub fn release(&mut self) -> bool {
        match self.registration.take() {
            Some(reg) => self.registry.unregister(&reg),
            None => false,
        }
    }
}

impl<K, P, C> Drop for RegistrationGuard<K, P, C>
where
    K: Eq + Hash + Clone + fmt::Debug,
    C: Channel,
{
    fn drop(&mut self) {
        self.release();
    }
}
