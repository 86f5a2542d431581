use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// mentorlink service configuration (`~/.mentorlink/config.toml`)
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub streams: StreamSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind to
    pub bind: SocketAddr,
    /// Allow any CORS origin instead of localhost only
    pub cors_permissive: bool,
    /// PostgreSQL connection string; `DATABASE_URL` is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections
    pub max_connections: u32,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            database_url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSection {
    /// Frames buffered per connection before new ones are dropped
    pub channel_capacity: usize,
    /// Interval between SSE keep-alive comments
    pub keep_alive_secs: u64,
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            keep_alive_secs: 15,
        }
    }
}

impl StreamSection {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(1))
    }
}

impl Config {
    /// Load from `path`, or from [`Config::default_path`] when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `~/.mentorlink/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mentorlink")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_is_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.bind.port(), 3030);
        assert_eq!(config.streams.channel_capacity, 64);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [streams]
            keep_alive_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.streams.keep_alive(), Duration::from_secs(5));
        assert_eq!(config.streams.channel_capacity, 64);
        assert!(!config.server.cors_permissive);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::from_toml_str("[server]\nbind = 12").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbind = \"0.0.0.0:8080\"\ndatabase_url = \"postgres://db/mentorlink\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.server.max_connections, 5);
        assert_eq!(
            config.server.database_url.as_deref(),
            Some("postgres://db/mentorlink")
        );
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn renders_back_to_toml() {
        let rendered = Config::default().to_toml_string().unwrap();
        assert!(rendered.contains("bind = \"127.0.0.1:3030\""));
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), Config::default());
    }
}
