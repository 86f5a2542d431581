//! Typed identifiers
//!
//! Registries are keyed by these, so a consultation stream can never be
//! addressed with a client id by accident.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// A scheduled mentoring session
    ConsultationId
);
uuid_id!(
    /// A mentee account
    ClientId
);
uuid_id!(
    /// Any account that can post chat messages (client or mentor)
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_uuid() {
        let raw = Uuid::parse_str("6f1c2a52-2b4e-4c47-9b6c-6a7f1c2d3e4f").unwrap();
        let id = ConsultationId::from_uuid(raw);
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"6f1c2a52-2b4e-4c47-9b6c-6a7f1c2d3e4f\""
        );
        assert_eq!(id.to_string(), raw.to_string());
    }
}
