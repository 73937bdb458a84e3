// ABOUTME: Durable storage for the deployment state document.
// ABOUTME: File-backed store with atomic rewrite, plus an in-memory store.

use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{DeploymentState, StateError};

/// Loads and saves the whole deployment state document.
///
/// Every `save` must be durable before it returns: a crash after a step must
/// not lose the mutation that step already applied.
pub trait StateStore: Send + Sync {
    /// Load the current document, creating it on first use.
    fn load(&self) -> Result<DeploymentState, StateError>;

    /// Read the document without creating it. `None` when nothing is stored yet.
    fn read(&self) -> Result<Option<DeploymentState>, StateError>;

    /// Replace the stored document.
    fn save(&self, state: &DeploymentState) -> Result<(), StateError>;
}

/// Stores the deployment state as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_err(&self, source: std::io::Error) -> StateError {
        StateError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<DeploymentState, StateError> {
        if let Some(state) = self.read()? {
            return Ok(state);
        }
        tracing::debug!("Creating deployment state at {}", self.path.display());
        let state = DeploymentState::generate();
        self.save(&state)?;
        Ok(state)
    }

    fn read(&self) -> Result<Option<DeploymentState>, StateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StateError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, state: &DeploymentState) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        // Write-then-rename so a crash never leaves a truncated document.
        let temp_path = self.temp_path();
        let mut file = std::fs::File::create(&temp_path).map_err(|e| self.write_err(e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| self.write_err(e))?;
        file.sync_all().map_err(|e| self.write_err(e))?;
        drop(file);

        std::fs::rename(&temp_path, &self.path).map_err(|e| self.write_err(e))?;
        tracing::trace!("Saved deployment state to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the deployment state in memory. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<Option<DeploymentState>>,
}

impl MemoryStateStore {
    pub fn new(state: DeploymentState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<DeploymentState, StateError> {
        let mut guard = self.state.lock();
        Ok(guard.get_or_insert_with(DeploymentState::generate).clone())
    }

    fn read(&self) -> Result<Option<DeploymentState>, StateError> {
        Ok(self.state.lock().clone())
    }

    fn save(&self, state: &DeploymentState) -> Result<(), StateError> {
        *self.state.lock() = Some(state.clone());
        Ok(())
    }
}
