//! Session Storage - Persistence layer for the session snapshot
//!
//! One durable record under a fixed name. The file variant writes to a
//! temporary sibling and renames it into place.

use super::types::{PersistedSession, SessionSnapshot};
use licensify_core::{ErrorContext, LicensifyError, LicensifyResult};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Durable store for the sanitized session snapshot
pub trait SessionPersistence: Send + Sync {
    /// Read the snapshot back, `None` when nothing was persisted yet
    fn load(&self) -> LicensifyResult<Option<SessionSnapshot>>;

    fn save(&self, snapshot: &SessionSnapshot) -> LicensifyResult<()>;
}

/// JSON file in the data directory
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> LicensifyResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error(e, "create_dir"))?;
        }

        info!("Session storage initialized at: {}", path.display());

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for FileSessionStorage {
    fn load(&self) -> LicensifyResult<Option<SessionSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json_data =
            std::fs::read_to_string(&self.path).map_err(|e| storage_error(e, "read"))?;
        let persisted: PersistedSession = serde_json::from_str(&json_data)?;

        debug!(
            version = persisted.version,
            "Loaded session snapshot from {}",
            self.path.display()
        );
        Ok(Some(persisted.state))
    }

    fn save(&self, snapshot: &SessionSnapshot) -> LicensifyResult<()> {
        let json_data = serde_json::to_string_pretty(&PersistedSession::new(snapshot.clone()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json_data).map_err(|e| storage_error(e, "write"))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| storage_error(e, "rename"))?;

        debug!("Saved session snapshot to {}", self.path.display());
        Ok(())
    }
}

/// Process-local storage, used by tests and throwaway shells
#[derive(Default)]
pub struct MemorySessionStorage {
    snapshot: Mutex<Option<SessionSnapshot>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }
}

impl SessionPersistence for MemorySessionStorage {
    fn load(&self) -> LicensifyResult<Option<SessionSnapshot>> {
        let guard = self.snapshot.lock().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    fn save(&self, snapshot: &SessionSnapshot) -> LicensifyResult<()> {
        let mut guard = self.snapshot.lock().map_err(|_| poisoned())?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}

fn storage_error(error: std::io::Error, operation: &str) -> LicensifyError {
    LicensifyError::Storage {
        message: format!("Session storage {} failed: {}", operation, error),
        source: Some(Box::new(error)),
        context: ErrorContext::new("session_storage")
            .with_operation(operation)
            .with_suggestion("Check that storage.data_dir is writable"),
    }
}

fn poisoned() -> LicensifyError {
    LicensifyError::Storage {
        message: "Session storage lock poisoned".to_string(),
        source: None,
        context: ErrorContext::new("session_storage"),
    }
}
