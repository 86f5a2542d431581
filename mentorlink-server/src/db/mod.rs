//! Database layer - consultation store
//!
//! Handlers only see the [`ConsultationStore`] trait. [`PgStore`] is the
//! production implementation, [`MemoryStore`] backs tests and `--memory`
//! runs.

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use postgres::PgStore;
pub use store::{ConsultationStore, DbError};
