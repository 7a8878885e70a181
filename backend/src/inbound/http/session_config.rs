//! Session cookie configuration.
//!
//! Resolves the signing key and cookie flags once at startup and builds the
//! session middleware shared by every worker.

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use std::path::{Path, PathBuf};
use tracing::warn;
use zeroize::Zeroize;

pub const SESSION_COOKIE_NAME: &str = "session";
const SESSION_KEY_MIN_LEN: usize = 64;
const SESSION_TTL_HOURS: i64 = 2;
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to a generated key when the key file is missing.
    Debug,
    /// Release builds need a key file unless ephemeral keys are allowed.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use campus_events::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Resolved session settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Resolve session settings from the configured key file and cookie flag.
///
/// `SESSION_ALLOW_EPHEMERAL` is read from `env`; when set, a missing key
/// file yields a generated key even in release builds.
///
/// # Examples
///
/// ```rust
/// use campus_events::inbound::http::session_config::{BuildMode, resolve_session_settings};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("campus_session_key_example");
/// std::fs::write(&key_path, vec![b'a'; 64])?;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = resolve_session_settings(&env, &key_path, true, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
///
/// std::fs::remove_file(&key_path)?;
/// # Ok(())
/// # }
/// ```
pub fn resolve_session_settings<E: Env>(
    env: &E,
    key_file: &Path,
    cookie_secure: bool,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env)?;
    let key = load_key(key_file, mode, allow_ephemeral)?;
    if !cookie_secure {
        warn!("session cookies are not marked Secure");
    }
    Ok(SessionSettings { key, cookie_secure })
}

fn allow_ephemeral_from_env<E: Env>(env: &E) -> Result<bool, SessionConfigError> {
    match env.string(ALLOW_EPHEMERAL_ENV) {
        None => Ok(false),
        Some(value) => parse_bool(&value).ok_or(SessionConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn load_key(path: &Path, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Private, HTTP-only `SameSite=Lax` cookie sessions with a two hour TTL.
pub fn session_middleware(settings: &SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}
