//! Persisted token storage — lets a session survive a process restart.
//!
//! The record is scoped to the client device (a JSON file, the desktop
//! analogue of the browser's localStorage). Durability is best-effort: the
//! controller logs storage failures and keeps the in-memory session
//! authoritative.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::session::AuthUser;

/// Storage failure. Never fatal to the in-memory session.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("persisted session record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// What a successful login leaves on disk: the token plus enough identity to
/// restore the session without a verifier round-trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub user: AuthUser,
    /// Unix seconds at persist time; consulted by the restore age policy.
    pub issued_at_unix: i64,
}

/// Device-local token persistence consumed by the controller.
pub trait TokenStorage: Send + Sync {
    /// Read the persisted record, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] on read failure, [`StorageError::Malformed`] when
    /// the stored bytes do not parse.
    fn read(&self) -> Result<Option<PersistedSession>, StorageError>;

    /// Persist the record, replacing any previous one.
    ///
    /// # Errors
    ///
    /// [`StorageError`] on serialization or write failure.
    fn write(&self, record: &PersistedSession) -> Result<(), StorageError>;

    /// Remove the persisted record. Removing an absent record is a no-op.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] on removal failure.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// FILE STORAGE
// =============================================================================

/// JSON-file-backed storage at a caller-chosen path.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileTokenStorage {
    fn read(&self) -> Result<Option<PersistedSession>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_str(&raw)?;
        Ok(Some(record))
    }

    fn write(&self, record: &PersistedSession) -> Result<(), StorageError> {
        let raw = serde_json::to_string(record)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// In-memory storage for demos and tests.
#[derive(Default)]
pub struct MemoryTokenStorage {
    record: Mutex<Option<PersistedSession>>,
}

impl MemoryTokenStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn read(&self) -> Result<Option<PersistedSession>, StorageError> {
        Ok(self.record.lock().expect("storage lock poisoned").clone())
    }

    fn write(&self, record: &PersistedSession) -> Result<(), StorageError> {
        *self.record.lock().expect("storage lock poisoned") = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.record.lock().expect("storage lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
