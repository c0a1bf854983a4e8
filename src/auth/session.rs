use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Session file name in the session directory
const SESSION_FILE: &str = "session.json";

/// Capacity of the session event channel.
/// Session transitions are rare; a small buffer is plenty.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// The full set of tokens identifying a login session.
///
/// All three fields are written and cleared together; a credential with any
/// field missing is not a session. The access token authorizes API requests,
/// the refresh token and sid are used only to mint new tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub sid: String,
}

impl Credential {
    pub fn new(access_token: String, refresh_token: String, sid: String) -> Self {
        Self {
            access_token,
            refresh_token,
            sid,
        }
    }

    /// True when all three fields are present.
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty() && !self.sid.is_empty()
    }
}

/// Lifecycle notifications consumed by the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session could not be renewed; the user must log in again.
    Expired,
    /// The user logged out.
    LoggedOut,
}

/// Holds the current credential and its on-disk copy.
///
/// Owned by the application root and shared (via `Arc`) with the API client,
/// so each test can run against a fresh session in its own directory.
pub struct Session {
    session_dir: PathBuf,
    credential: RwLock<Option<Credential>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(session_dir: PathBuf) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session_dir,
            credential: RwLock::new(None),
            events,
        }
    }

    /// Restore a persisted session at process start.
    ///
    /// Returns true when a complete credential was found. A file with any
    /// token missing or empty is treated as no session.
    pub fn restore(&self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }

        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;
        let credential: Credential = match serde_json::from_str(&contents) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Session file is malformed, ignoring it");
                return Ok(false);
            }
        };

        if !credential.is_complete() {
            debug!("Session file holds a partial credential, treating as logged out");
            return Ok(false);
        }

        *self.write_guard() = Some(credential);
        info!("Restored session from disk");
        Ok(true)
    }

    /// Install a new credential (login or successful refresh) and persist it.
    /// All three tokens are replaced as a unit.
    pub fn install(&self, credential: Credential) -> Result<()> {
        let contents = serde_json::to_string_pretty(&credential)?;
        *self.write_guard() = Some(credential);

        std::fs::create_dir_all(&self.session_dir)
            .context("Failed to create session directory")?;
        std::fs::write(self.session_path(), contents).context("Failed to write session file")?;
        debug!("Session credential installed");
        Ok(())
    }

    /// The bearer token attached to outgoing requests, captured at send time.
    pub fn access_token(&self) -> Option<String> {
        self.read_guard().as_ref().map(|c| c.access_token.clone())
    }

    /// The (refresh token, sid) pair used for a refresh call, or `None` when
    /// either is absent - in which case there is nothing to refresh with.
    pub fn refresh_credentials(&self) -> Option<(String, String)> {
        let guard = self.read_guard();
        let credential = guard.as_ref()?;
        if credential.refresh_token.is_empty() || credential.sid.is_empty() {
            return None;
        }
        Some((credential.refresh_token.clone(), credential.sid.clone()))
    }

    pub fn is_logged_in(&self) -> bool {
        self.read_guard().is_some()
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Clear the session after an explicit logout.
    pub fn clear(&self) -> Result<()> {
        self.wipe()?;
        let _ = self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Tear down the session after an unrecoverable refresh failure.
    ///
    /// Idempotent: once the credential is gone, further calls only observe
    /// the already-cleared state and do not re-notify.
    pub fn teardown(&self) -> Result<()> {
        let had_session = self.read_guard().is_some();
        self.wipe()?;
        if had_session {
            info!("Session torn down after refresh failure");
            let _ = self.events.send(SessionEvent::Expired);
        }
        Ok(())
    }

    fn wipe(&self) -> Result<()> {
        *self.write_guard() = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.session_dir.join(SESSION_FILE)
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Option<Credential>> {
        // A poisoned lock means a writer panicked mid-assignment of an
        // Option, which leaves no torn state worth failing over.
        self.credential.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<Credential>> {
        self.credential.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Install a credential in memory only. Used for sessions that should not
    /// outlive the process, and by tests that need a partial credential.
    pub fn install_transient(&self, credential: Credential) {
        *self.write_guard() = Some(credential);
    }
}
