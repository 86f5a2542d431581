//! Server-sent event frames
//!
//! A [`Frame`] is one event's data payload. On the wire it is encoded as
//! `data: <line>\n` for each line of the payload followed by a blank line,
//! so a compact JSON payload becomes exactly `data: <JSON>\n\n`.

use std::sync::Arc;

use serde::Serialize;

/// One SSE event payload, cheap to clone for fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Arc<str>,
}

impl Frame {
    /// Serialize a payload as compact JSON.
    ///
    /// # Example
    /// ```
    /// use mentorlink_core::Frame;
    /// use serde_json::json;
    ///
    /// let frame = Frame::json(&json!({"msg": "hello"})).unwrap();
    /// assert_eq!(frame.encode(), "data: {\"msg\":\"hello\"}\n\n");
    /// ```
    pub fn json<P>(payload: &P) -> Result<Self, serde_json::Error>
    where
        P: Serialize + ?Sized,
    {
        let text = serde_json::to_string(payload)?;
        Ok(Self::text(text))
    }

    /// Wrap already-serialized text.
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            data: Arc::from(data.into()),
        }
    }

    /// The event data without SSE framing.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Encode as an SSE event block.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.data.len() + 8);
        for line in self.data.split('\n') {
            out.push_str("data: ");
            out.push_str(line.strip_suffix('\r').unwrap_or(line));
            out.push('\n');
        }
        out.push('\n');
        out
    }
}
