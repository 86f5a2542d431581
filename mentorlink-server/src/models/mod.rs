//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod consultation;
pub mod events;
pub mod ids;
pub mod message;
pub mod validation;

pub use consultation::{Consultation, ConsultationStatus, NewConsultation};
pub use events::{ChatEvent, ConsultationUpdate};
pub use ids::{ClientId, ConsultationId, UserId};
pub use message::{ChatMessage, MessageBody, NewMessage, SenderRole};
pub use validation::ValidationError;
