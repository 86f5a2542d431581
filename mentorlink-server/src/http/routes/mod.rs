//! Route handlers organized by resource

pub mod consultations;
pub mod health;
pub mod messages;
pub mod stream;
