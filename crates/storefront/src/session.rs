//! Local session persistence.
//!
//! The session store is a small JSON file of string keys and string values,
//! the client-side equivalent of browser local storage. The token and the
//! logged-in user live under fixed keys so other tools (and the admin
//! console) can share one session file.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use spokeshop_gateway::types::User;

/// Fixed keys under which the session is stored.
pub mod session_keys {
    /// Bearer token returned by the login endpoint.
    pub const JWT_TOKEN: &str = "jwtToken";
    /// JSON-encoded [`User`](spokeshop_gateway::types::User) record.
    pub const CURRENT_USER: &str = "currentUser";
}

/// Errors that can occur reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session file i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed string key-value store holding the session.
///
/// Every mutation persists immediately. A corrupt file is treated as an
/// empty store rather than an error, so a damaged session degrades to
/// "logged out" instead of wedging the client.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl SessionStore {
    /// Open the store at `path`, loading existing values if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionStoreError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt session file, starting empty");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };
        Ok(Self { path, values })
    }

    /// Get a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a raw value and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), SessionStoreError> {
        self.values.insert(key.into(), value.into());
        self.persist()
    }

    /// Remove a value and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn remove(&mut self, key: &str) -> Result<(), SessionStoreError> {
        self.values.remove(key);
        self.persist()
    }

    // =========================================================================
    // Session Helpers
    // =========================================================================

    /// The stored bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.get(session_keys::JWT_TOKEN)
    }

    /// The stored user record, if present and well-formed.
    ///
    /// A corrupt user entry reads as `None`, the same "logged out"
    /// degradation as a corrupt file.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        let raw = self.get(session_keys::CURRENT_USER)?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "corrupt stored user record, treating as logged out");
                None
            }
        }
    }

    /// Store a full session (token plus user) and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be serialized or the file
    /// cannot be written.
    pub fn set_session(&mut self, token: &str, user: &User) -> Result<(), SessionStoreError> {
        let user_json = serde_json::to_string(user)?;
        self.values
            .insert(session_keys::JWT_TOKEN.to_owned(), token.to_owned());
        self.values
            .insert(session_keys::CURRENT_USER.to_owned(), user_json);
        self.persist()
    }

    /// Remove the token and user entries and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn clear_session(&mut self) -> Result<(), SessionStoreError> {
        self.values.remove(session_keys::JWT_TOKEN);
        self.values.remove(session_keys::CURRENT_USER);
        self.persist()
    }

    fn persist(&self) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
