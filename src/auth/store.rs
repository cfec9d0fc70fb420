//! Session token persistence
//!
//! Sessions are persisted to a single JSON document shared across process
//! restarts: an array of `{email, bearer, exp}` objects, at most one entry
//! per account, with `exp` in epoch milliseconds. The file may be shared by
//! multiple processes, so writes never regress a fresher token and are
//! atomic from a reader's perspective (written to a temp file in the same
//! directory, then renamed into place).
//!
//! Loading is deliberately tolerant: an absent, unreadable, or corrupt file
//! is logged and treated as "no session" so the bridge can always start and
//! re-authenticate.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::manager::Session;
use crate::error::{Result, ShinebridgeError};

/// One persisted session entry.
///
/// Field names match the on-disk document shared with other consumers of
/// the token file, so they stay in the vendor's vocabulary rather than ours.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    /// Account identifier the session belongs to.
    email: String,
    /// The vendor-prefixed bearer token, verbatim.
    bearer: String,
    /// Absolute expiry, epoch milliseconds.
    exp: i64,
}

/// File-backed store of persisted sessions, keyed by account identifier.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store over the given token file path.
    ///
    /// The file (and its parent directory) is created lazily on the first
    /// [`save`](Self::save).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session for `account_id`.
    ///
    /// Returns `None` when the file is absent, unparsable, or contains no
    /// entry for the account. Parse failures are logged, never fatal.
    pub fn load(&self, account_id: &str) -> Option<Session> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        let entries: Vec<StoredSession> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse session file {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        let found = entries.into_iter().find(|entry| entry.email == account_id)?;
        let expires_at = DateTime::<Utc>::from_timestamp_millis(found.exp)?;
        tracing::debug!("Loaded persisted session for {}", account_id);
        Some(Session::new(found.bearer, expires_at))
    }

    /// Upsert the session entry for `account_id`.
    ///
    /// If the persisted entry for the account is still in the future and not
    /// older than the new session, the write is skipped entirely: a slower
    /// process must not stomp a fresher token, and an identical save must
    /// not rewrite the file. Otherwise the entry is inserted or replaced and
    /// the whole document is rewritten atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ShinebridgeError::Store`] when the document cannot be
    /// written. Callers treat this as non-fatal; the in-memory session
    /// remains usable.
    pub fn save(&self, account_id: &str, session: &Session) -> Result<()> {
        let mut entries: Vec<StoredSession> = match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => Vec::new(),
        };

        let new_exp = session.expires_at().timestamp_millis();
        let now = Utc::now().timestamp_millis();

        if let Some(existing) = entries.iter_mut().find(|entry| entry.email == account_id) {
            if existing.exp > now && existing.exp >= new_exp {
                tracing::debug!("Persisted session for {} is at least as fresh, skipping write", account_id);
                return Ok(());
            }
            existing.bearer = session.token().to_string();
            existing.exp = new_exp;
        } else {
            entries.push(StoredSession {
                email: account_id.to_string(),
                bearer: session.token().to_string(),
                exp: new_exp,
            });
        }

        self.write_atomic(&entries)
    }

    /// Serialize `entries` to a temp file next to the target and rename it
    /// into place so readers never observe a partial document.
    fn write_atomic(&self, entries: &[StoredSession]) -> Result<()> {
        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            std::fs::create_dir_all(dir)
                .map_err(|e| ShinebridgeError::Store(format!("cannot create {}: {e}", dir.display())))?;
        }

        let dir = parent.unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| ShinebridgeError::Store(format!("cannot create temp file: {e}")))?;
        serde_json::to_writer(&tmp, entries)
            .map_err(|e| ShinebridgeError::Store(format!("cannot serialize session file: {e}")))?;
        tmp.persist(&self.path).map_err(|e| {
            ShinebridgeError::Store(format!("cannot persist {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}
