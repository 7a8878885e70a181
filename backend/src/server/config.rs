//! HTTP server configuration object and helpers.

use campus_events::inbound::http::session_config::SessionSettings;
use campus_events::outbound::persistence::DbPool;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) upload_dir: PathBuf,
    pub(crate) max_upload_bytes: usize,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, upload_dir: PathBuf) -> Self {
        Self {
            session,
            bind_addr,
            upload_dir,
            max_upload_bytes: campus_events::inbound::http::multipart::DEFAULT_MAX_UPLOAD_BYTES,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool the server runs on in-memory repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
