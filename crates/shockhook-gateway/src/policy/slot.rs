//! Durable single-record storage for the policy.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use shockhook_core::error::{Result, ShockhookError};
use shockhook_core::policy::Policy;

/// Opaque durable slot holding at most one `Policy`.
#[async_trait]
pub trait PolicySlot: Send + Sync {
    async fn load(&self) -> Result<Option<Policy>>;
    async fn save(&self, policy: &Policy) -> Result<()>;
}

/// JSON file under the state directory, replaced atomically on save.
#[derive(Debug)]
pub struct FileSlot {
    dir: PathBuf,
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileSlot {
    pub const FILE_NAME: &'static str = "state.json";

    /// Create the state directory if needed and bind to `<dir>/state.json`.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            ShockhookError::Persistence(format!(
                "cannot create state directory {}: {e}",
                dir.display()
            ))
        })?;
        let path = dir.join(Self::FILE_NAME);
        let tmp_path = dir.join(format!("{}.tmp", Self::FILE_NAME));
        Ok(Self {
            dir: dir.to_path_buf(),
            path,
            tmp_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PolicySlot for FileSlot {
    async fn load(&self) -> Result<Option<Policy>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ShockhookError::Persistence(format!(
                    "read {} failed: {e}",
                    self.path.display()
                )))
            }
        };
        let policy = serde_json::from_slice(&raw).map_err(|e| {
            ShockhookError::Persistence(format!("corrupt state {}: {e}", self.path.display()))
        })?;
        Ok(Some(policy))
    }

    async fn save(&self, policy: &Policy) -> Result<()> {
        let raw = serde_json::to_vec_pretty(policy)
            .map_err(|e| ShockhookError::Internal(format!("encode policy failed: {e}")))?;

        let persist_err = |e: std::io::Error| {
            ShockhookError::Persistence(format!("write {} failed: {e}", self.path.display()))
        };

        let mut file = tokio::fs::File::create(&self.tmp_path)
            .await
            .map_err(persist_err)?;
        file.write_all(&raw).await.map_err(persist_err)?;
        file.sync_all().await.map_err(persist_err)?;
        drop(file);

        tokio::fs::rename(&self.tmp_path, &self.path)
            .await
            .map_err(persist_err)?;
        sync_dir(&self.dir).await.map_err(persist_err)
    }
}

/// Flush the directory entry so the rename itself is durable.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Process-local slot. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySlot {
    value: Mutex<Option<Policy>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: Policy) -> Self {
        Self {
            value: Mutex::new(Some(policy)),
        }
    }

    /// Last saved value, for inspection in tests.
    pub fn stored(&self) -> Option<Policy> {
        self.value.lock().ok().and_then(|v| v.clone())
    }
}

#[async_trait]
impl PolicySlot for MemorySlot {
    async fn load(&self) -> Result<Option<Policy>> {
        self.value
            .lock()
            .map(|v| v.clone())
            .map_err(|_| ShockhookError::Internal("memory slot poisoned".into()))
    }

    async fn save(&self, policy: &Policy) -> Result<()> {
        let mut v = self
            .value
            .lock()
            .map_err(|_| ShockhookError::Internal("memory slot poisoned".into()))?;
        *v = Some(policy.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_slot_is_empty_until_saved() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::open(dir.path().join("nested")).await.unwrap();
        assert!(slot.load().await.unwrap().is_none());

        let p = Policy {
            paused: false,
            intensity: 42,
            allowed_rooms: None,
            ..Policy::default()
        };
        slot.save(&p).await.unwrap();
        assert_eq!(slot.load().await.unwrap(), Some(p));
        assert!(!dir.path().join("nested/state.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_slot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let p = Policy {
            allow_vibrate: true,
            ..Policy::default()
        };
        FileSlot::open(dir.path()).await.unwrap().save(&p).await.unwrap();

        let reopened = FileSlot::open(dir.path()).await.unwrap();
        assert_eq!(reopened.load().await.unwrap(), Some(p));
    }

    #[tokio::test]
    async fn save_fails_when_state_dir_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state");
        let slot = FileSlot::open(&state).await.unwrap();
        slot.save(&Policy::default()).await.unwrap();

        std::fs::remove_dir_all(&state).unwrap();
        let err = slot.save(&Policy::default()).await.unwrap_err();
        assert!(matches!(err, ShockhookError::Persistence(_)));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FileSlot::FILE_NAME), b"{not json").unwrap();
        let slot = FileSlot::open(dir.path()).await.unwrap();
        let err = slot.load().await.unwrap_err();
        assert!(matches!(err, ShockhookError::Persistence(_)));
    }
}
