//! Structured error types for mentorlink-core.
//!
//! Registration and removal cannot fail, so the registry only reports
//! payload serialization. Per-channel write failures are values of
//! [`ChannelError`] that the registry logs rather than propagates.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broadcast failed before any channel was written
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single push channel rejected a frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Receiver is gone (client disconnected, stream dropped)
    #[error("channel closed")]
    Closed,

    /// Consumer is not keeping up; the frame was dropped
    #[error("channel full")]
    Full,

    #[error("channel write failed: {0}")]
    Other(String),
}

/// Configuration loading failed
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_error_display() {
        assert_eq!(ChannelError::Closed.to_string(), "channel closed");
        assert_eq!(
            ChannelError::Other("broken pipe".into()).to_string(),
            "channel write failed: broken pipe"
        );
    }
}
