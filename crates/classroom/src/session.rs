//! Session holder: the authenticated identity and its credential.
//!
//! The session lives for the lifetime of the process and is persisted as a
//! small JSON file under a fixed name, mirroring the fixed storage keys the
//! backend's web clients use. Views only read it; the login, register and
//! logout flows are the only writers.

use crate::api::types::User;
use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The authenticated identity plus its bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    /// A short digest of the credential, safe to log.
    ///
    /// The raw token never appears in logs.
    pub fn token_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.token.as_bytes());
        let result = hasher.finalize();
        format!("{}...", hex::encode(&result[..4]))
    }
}

/// Process-wide holder for the current session, with file persistence.
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    /// Creates an empty store that persists to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: None,
        }
    }

    /// Loads a previously persisted session if one exists and parses.
    ///
    /// Any read or parse failure just starts the store empty; a stale file is
    /// not an error, the user logs in again.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        store.current = match fs::read_to_string(&store.path) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    info!(
                        user_id = session.user.id,
                        role = %session.user.role,
                        token = %session.token_digest(),
                        "Restored persisted session"
                    );
                    Some(session)
                }
                Err(e) => {
                    warn!(path = %store.path.display(), error = %e, "Ignoring unreadable session file");
                    None
                }
            },
            Err(_) => {
                debug!(path = %store.path.display(), "No persisted session");
                None
            }
        };
        store
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    /// The credential, or `AuthRequired` so the caller can short-circuit
    /// without touching the backend.
    pub fn require_token(&self) -> Result<&str, ApiError> {
        self.token().ok_or(ApiError::AuthRequired)
    }

    /// Installs a new session (login or registration) and persists it.
    ///
    /// Persistence failures are logged and tolerated; the in-memory session
    /// stays valid for this run.
    pub fn set(&mut self, session: Session) {
        info!(
            user_id = session.user.id,
            role = %session.user.role,
            token = %session.token_digest(),
            "Session established"
        );
        if let Err(e) = persist(&self.path, &session) {
            warn!(path = %self.path.display(), error = %e, "Could not persist session");
        }
        self.current = Some(session);
    }

    /// Clears the session and removes the persisted file.
    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            info!("Session cleared");
        }
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "Could not remove session file");
            }
        }
    }
}

fn persist(path: &Path, session: &Session) -> std::io::Result<()> {
    let raw = serde_json::to_string_pretty(session)?;
    fs::write(path, raw)
}

/// Helper module for hex encoding (avoiding extra dependency).
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        Session {
            user: User {
                id: 7,
                nom: "Curie".to_string(),
                prenom: "Marie".to_string(),
                email: Some("mc@ex.fr".to_string()),
                role: "Professeur".to_string(),
            },
            token: "secret-token".to_string(),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("classroom_session_test_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_digest_hides_token() {
        let session = sample_session();
        let digest = session.token_digest();
        assert!(!digest.contains("secret"));
        assert!(digest.ends_with("..."));
    }

    #[test]
    fn test_persist_and_restore() {
        let path = temp_path("roundtrip");
        let mut store = SessionStore::new(&path);
        store.set(sample_session());

        let restored = SessionStore::load(&path);
        let session = restored.current().unwrap();
        assert_eq!(session.user.role, "Professeur");
        assert_eq!(session.token, "secret-token");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_clear_removes_file() {
        let path = temp_path("clear");
        let mut store = SessionStore::new(&path);
        store.set(sample_session());
        assert!(path.exists());

        store.clear();
        assert!(store.current().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_require_without_session() {
        let store = SessionStore::new(temp_path("missing"));
        assert!(matches!(store.require_token(), Err(ApiError::AuthRequired)));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json").unwrap();
        let store = SessionStore::load(&path);
        assert!(store.current().is_none());
        let _ = fs::remove_file(&path);
    }
}
