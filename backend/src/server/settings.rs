//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CAMPUS_*` environment variables, or a
//! configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUS")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; in-memory adapters are used when absent.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Directory receiving event attachments.
    pub upload_dir: Option<PathBuf>,
    /// Largest accepted attachment in bytes.
    pub max_upload_bytes: Option<usize>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }
}
