//! Input validation failures, mapped to 400 by the HTTP layer

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Stored or submitted text that names no known variant
    #[error("invalid {field} value: '{value}'")]
    InvalidVariant { field: &'static str, value: String },
}

/// Trim `raw` and check it is non-empty and at most `max` characters.
pub(crate) fn bounded_text(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_long_message() {
        let err = ValidationError::TooLong {
            field: "body",
            max: 4000,
        };
        assert_eq!(
            err.to_string(),
            "body exceeds maximum length of 4000 characters"
        );
    }

    #[test]
    fn bounded_text_counts_chars_not_bytes() {
        assert_eq!(bounded_text("topic", " ünï ", 3).unwrap(), "ünï");
        assert_eq!(
            bounded_text("topic", "   ", 3),
            Err(ValidationError::Empty { field: "topic" })
        );
        assert_eq!(
            bounded_text("topic", "abcd", 3),
            Err(ValidationError::TooLong { field: "topic", max: 3 })
        );
    }
}
