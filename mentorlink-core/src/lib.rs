//! mentorlink-core: push delivery primitives
//!
//! - [`registry::Registry`]: open push channels keyed by a correlation key,
//!   with per-key fan-out
//! - [`channel::Channel`]: the write side of a push channel
//! - [`sse::Frame`]: one server-sent event and its wire encoding
//! - [`config::Config`]: service configuration (TOML)

pub mod channel;
pub mod config;
pub mod error;
pub mod registry;
pub mod sse;

pub use channel::{Channel, MpscChannel};
pub use config::{Config, ServerSection, StreamSection};
pub use error::{ChannelError, ConfigError, RegistryError};
pub use registry::{ConnectionId, Delivery, Registration, RegistrationGuard, Registry};
pub use sse::Frame;
