//! mentorlink-server: consultation push service
//!
//! Serves the consultation chat and status endpoints and holds the open
//! SSE connections they push to. The database stays the source of truth;
//! pushes are best effort.

pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use http::{build_router, run_server, ApiError, ServerConfig, ServerError};
pub use state::AppState;
