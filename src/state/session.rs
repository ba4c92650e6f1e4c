//! Session context: the credential every authenticated request needs.
//!
//! SYSTEM CONTEXT
//! ==============
//! A `Session` is created once at startup and handed explicitly to pages,
//! components and the search coordinator. `begin` stores a token after
//! login, `end` clears it on logout, and `require_token` is the single gate
//! authenticated calls pass through.
//!
//! TRADE-OFFS
//! ==========
//! The token is cached in memory and written through to the store. A store
//! write failure is reported to the caller but the in-memory session stays
//! usable for the rest of the process.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::lock;
use crate::net::api::ApiError;

/// Opaque credential issued at login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens end up in logs via `Debug` on containing types; keep them out.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token store is corrupt: {0}")]
    Encoding(#[from] serde_json::Error),
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// Client-local persistence for the session token.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the backing storage cannot be read.
    fn load(&self) -> Result<Option<SessionToken>, SessionError>;

    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the backing storage cannot be written.
    fn save(&self, token: &SessionToken) -> Result<(), SessionError>;

    /// Remove the stored token.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the backing storage cannot be written.
    fn clear(&self) -> Result<(), SessionError>;
}

/// On-disk shape; the token lives under the fixed `key` field.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    key: Option<String>,
}

/// JSON file holding `{"key": "<token>"}`.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io { path: self.path.clone(), source }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let stored: StoredSession = serde_json::from_str(&raw)?;
        Ok(stored
            .key
            .filter(|key| !key.trim().is_empty())
            .map(SessionToken::new))
    }

    fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let raw = serde_json::to_string(&StoredSession { key: Some(token.as_str().to_owned()) })?;
        std::fs::write(&self.path, raw).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local store for embedding and tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        Ok(lock(&self.token).clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        *lock(&self.token) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *lock(&self.token) = None;
        Ok(())
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Shared handle to the current credential. Clones observe the same session.
#[derive(Clone)]
pub struct Session {
    token: Arc<Mutex<Option<SessionToken>>>,
    store: Arc<dyn TokenStore>,
}

impl Session {
    /// Open a session backed by `store`, restoring a previously saved token.
    ///
    /// An unreadable store is logged and treated as signed out.
    #[must_use]
    pub fn open(store: Arc<dyn TokenStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "stored session unreadable; starting signed out");
                None
            }
        };
        debug!(signed_in = token.is_some(), "session opened");
        Self { token: Arc::new(Mutex::new(token)), store }
    }

    /// A signed-out session with nothing persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryTokenStore::default()))
    }

    /// Start the session with a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the token could not be persisted; the
    /// in-memory session is signed in regardless.
    pub fn begin(&self, token: SessionToken) -> Result<(), SessionError> {
        let persisted = self.store.save(&token);
        *lock(&self.token) = Some(token);
        info!("session started");
        persisted
    }

    /// End the session and forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the stored token could not be removed.
    pub fn end(&self) -> Result<(), SessionError> {
        lock(&self.token).take();
        info!("session ended");
        self.store.clear()
    }

    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        lock(&self.token).clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        lock(&self.token).is_some()
    }

    /// Gate for authenticated requests.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] when no one is signed in.
    pub fn require_token(&self) -> Result<SessionToken, ApiError> {
        self.token().ok_or(ApiError::MissingToken)
    }
}
