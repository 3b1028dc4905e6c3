//! Durable session state for the admin client.
//!
//! The store keeps the authenticated identity in a JSON file under the
//! standard configuration directory (`~/.config/edutage/session.json` on
//! most platforms) and the bearer token either in the OS keychain or inline
//! in that file, selected by `EDUTAGE_CREDENTIAL_BACKEND`. It is constructed
//! once at startup and injected into whatever needs it; there is no global.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirs_next::config_dir;
use edutage_types::{AuthResponse, CredentialProvider, SchoolSummary, UserIdentity};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Environment variable allowing callers to override the session file path.
pub const SESSION_PATH_ENV: &str = "EDUTAGE_SESSION_PATH";

/// Environment variable selecting where the token is persisted.
pub const CREDENTIAL_BACKEND_ENV: &str = "EDUTAGE_CREDENTIAL_BACKEND";

/// Default filename for the JSON payload.
pub const SESSION_FILE_NAME: &str = "session.json";

const KEYRING_SERVICE: &str = "edutage";
const KEYRING_USER: &str = "session-token";

/// Error surfaced when reading or writing the session fails.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Keychain access failure.
    #[error("session keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Where the bearer token lives between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialBackend {
    /// OS keychain via `keyring-rs`.
    Keychain,
    /// Inline in the session file. Used for CI and keychain-free hosts.
    File,
}

impl CredentialBackend {
    fn from_env() -> Self {
        match env::var(CREDENTIAL_BACKEND_ENV)
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "file" => Self::File,
            _ => Self::Keychain,
        }
    }
}

/// The established session: credential plus who it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub identity: UserIdentity,
    pub school: SchoolSummary,
}

impl Session {
    pub fn from_auth(auth: &AuthResponse) -> Self {
        Self {
            token: auth.token.clone(),
            identity: auth.user.clone(),
            school: auth.school.clone(),
        }
    }
}

/// On-disk shape. The token field is only populated under the file backend.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionPayload {
    identity: Option<UserIdentity>,
    school: Option<SchoolSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Thread-safe session store backed by a JSON file.
///
/// `set_session` persists durably before swapping the in-memory state under
/// the lock, so a concurrent reader observes either the previous session or
/// the new one, never a half-written mixture.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    backend: CredentialBackend,
    state: Mutex<Option<Session>>,
    persist_to_disk: bool,
}

impl SessionStore {
    /// Load the store from durable storage, tolerating a missing or
    /// malformed file the same way a fresh install would.
    pub fn load() -> Result<Self, SessionStoreError> {
        let path = default_session_path();
        let backend = CredentialBackend::from_env();
        let payload = load_payload(&path)?;
        let state = restore_session(payload, backend);
        Ok(Self {
            path,
            backend,
            state: Mutex::new(state),
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store used as a fallback when the config
    /// directory cannot be accessed, and by tests.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            backend: CredentialBackend::File,
            state: Mutex::new(None),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Synchronous, side-effect-free snapshot of the current session.
    pub fn session(&self) -> Option<Session> {
        self.state.lock().expect("session lock poisoned").clone()
    }

    /// Persist a new session durably, then publish it to readers.
    pub fn set_session(&self, session: Session) -> Result<(), SessionStoreError> {
        if self.persist_to_disk {
            let payload = SessionPayload {
                identity: Some(session.identity.clone()),
                school: Some(session.school.clone()),
                token: match self.backend {
                    CredentialBackend::File => Some(session.token.clone()),
                    CredentialBackend::Keychain => None,
                },
            };
            if self.backend == CredentialBackend::Keychain {
                keyring_entry()?.set_password(&session.token)?;
            }
            self.save_payload(&payload)?;
        }
        *self.state.lock().expect("session lock poisoned") = Some(session);
        Ok(())
    }

    /// Remove the session from durable storage and memory.
    pub fn clear_session(&self) -> Result<(), SessionStoreError> {
        if self.persist_to_disk {
            match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => return Err(SessionStoreError::Io(error)),
            }
            if self.backend == CredentialBackend::Keychain {
                match keyring_entry()?.delete_credential() {
                    Ok(()) | Err(keyring::Error::NoEntry) => {}
                    Err(error) => return Err(SessionStoreError::Keyring(error)),
                }
            }
        }
        *self.state.lock().expect("session lock poisoned") = None;
        Ok(())
    }

    fn save_payload(&self, payload: &SessionPayload) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl CredentialProvider for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.state
            .lock()
            .expect("session lock poisoned")
            .as_ref()
            .map(|session| session.token.clone())
    }
}

fn keyring_entry() -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
}

fn default_session_path() -> PathBuf {
    if let Ok(path) = env::var(SESSION_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("edutage")
        .join(SESSION_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<SessionPayload, SessionStoreError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse session file; treating as logged out"
                );
                Ok(SessionPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Ok(SessionPayload::default())
        }
        Err(error) => Err(SessionStoreError::Io(error)),
    }
}

/// Reassemble a session from the persisted payload plus the token backend.
fn restore_session(payload: SessionPayload, backend: CredentialBackend) -> Option<Session> {
    let identity = payload.identity?;
    let school = payload.school?;
    let token = match backend {
        CredentialBackend::File => payload.token,
        CredentialBackend::Keychain => match keyring_entry().and_then(|entry| entry.get_password()) {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(error) => {
                warn!(error = %error, "Could not read session token from keychain");
                None
            }
        },
    };
    match token {
        Some(token) => Some(Session {
            token,
            identity,
            school,
        }),
        None => {
            warn!("Session identity found but credential is missing; treating as logged out");
            None
        }
    }
}
