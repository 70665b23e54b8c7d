use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

use super::Credential;
use crate::error::DashError;

/// Persistence for the single fitness credential record.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Missing records surface as [`DashError::CredentialNotFound`].
    async fn load(&self) -> Result<Credential, DashError>;
    async fn save(&self, credential: &Credential) -> Result<(), DashError>;
}

/// JSON file store. Writes go to a sibling temp file that is renamed into place.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "token.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Credential, DashError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DashError::CredentialNotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| DashError::CredentialDecode(e.to_string()))
    }

    async fn save(&self, credential: &Credential) -> Result<(), DashError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let body = serde_json::to_vec_pretty(credential)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), expiry = %credential.expiry, "credential persisted");
        Ok(())
    }
}

/// In-process store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Credential>>,
    saves: Mutex<usize>,
}

impl MemoryTokenStore {
    pub fn new(initial: Option<Credential>) -> Self {
        Self {
            slot: Mutex::new(initial),
            saves: Mutex::new(0),
        }
    }

    /// Number of successful `save` calls.
    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Credential, DashError> {
        self.slot
            .lock()
            .await
            .clone()
            .ok_or_else(|| DashError::CredentialNotFound(PathBuf::from("<memory>")))
    }

    async fn save(&self, credential: &Credential) -> Result<(), DashError> {
        *self.slot.lock().await = Some(credential.clone());
        *self.saves.lock().await += 1;
        Ok(())
    }
}
