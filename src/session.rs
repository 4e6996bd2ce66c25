//! Durable transport session storage
//!
//! The transport hands the gateway an opaque credential blob on successful
//! authentication; we persist it so the next start can skip pairing. The
//! store makes no attempt to interpret or protect the blob.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Opaque transport credential blob
pub type Session = serde_json::Value;

/// Reads and writes the session blob at a fixed path
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store for the given path
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default session path under the XDG data directory
    ///
    /// Uses `~/.local/share/relay/session.json` on Linux, falling back to
    /// `./session.json` when no home directory is available.
    #[must_use]
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "relay", "relay").map_or_else(
            || PathBuf::from("session.json"),
            |d| d.data_dir().join("session.json"),
        )
    }

    /// Path this store reads and writes
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session, if any
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Persistence(format!("read {}: {e}", self.path.display())))?;
        let session = serde_json::from_str(&content)
            .map_err(|e| Error::Persistence(format!("parse {}: {e}", self.path.display())))?;

        Ok(Some(session))
    }

    /// Persist the session blob
    ///
    /// Writes a sibling temp file then renames it over the target, so a
    /// crashed write never leaves a truncated blob behind.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the blob cannot be written. The caller keeps
    /// its in-memory session; only the next start is affected.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::Persistence(format!("create {}: {e}", parent.display())))?;
            }
        }

        let json = serde_json::to_string(session)
            .map_err(|e| Error::Persistence(format!("serialize session: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| Error::Persistence(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Persistence(format!("rename {}: {e}", self.path.display())))?;

        tracing::debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }
}
