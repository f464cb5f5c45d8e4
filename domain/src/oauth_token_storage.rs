//! File-backed OAuth token storage.
//!
//! Implements `meeting_auth::oauth::token::Storage` over a single JSON file holding
//! the current token set. Writes go to a sibling temp file that is synced and then
//! renamed over the target, so readers only ever see a complete record.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::*;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use meeting_auth::{
    error::{storage_error, Error, StorageErrorKind},
    oauth::token::{Storage, TokenSet},
};

/// Token storage backed by one JSON file.
pub struct FileTokenStorage {
    path: PathBuf,
    // Serializes writers within this process.
    write_lock: Mutex<()>,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    async fn read(&self) -> Option<TokenSet> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No token file at {:?}", self.path);
                return None;
            }
            Err(e) => {
                warn!("Failed to read token file {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_slice(&content) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                warn!("Ignoring unreadable token file {:?}: {}", self.path, e);
                None
            }
        }
    }

    async fn write(&self, tokens: &TokenSet) -> Result<(), Error> {
        let content = serde_json::to_vec_pretty(tokens)
            .map_err(|e| storage_error(StorageErrorKind::Serialization, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(StorageErrorKind::Io, e))?;
        }

        let temp_path = self.temp_path();
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&temp_path)
            .await
            .map_err(|e| storage_error(StorageErrorKind::Io, e))?;
        file.write_all(&content)
            .await
            .map_err(|e| storage_error(StorageErrorKind::Io, e))?;
        file.sync_all()
            .await
            .map_err(|e| storage_error(StorageErrorKind::Io, e))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| storage_error(StorageErrorKind::Io, e))?;

        debug!("Saved tokens to {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl Storage for FileTokenStorage {
    async fn load(&self) -> Option<TokenSet> {
        self.read().await
    }

    async fn save(&self, tokens: &TokenSet) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;
        self.write(tokens).await
    }

    async fn update_atomic(
        &self,
        old_refresh: Option<&str>,
        new_tokens: &TokenSet,
    ) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;

        if let Some(stored) = self.read().await {
            if !stored.refresh_token_matches(old_refresh) {
                warn!("Refusing to overwrite tokens rotated by another writer");
                return Err(storage_error(
                    StorageErrorKind::AtomicUpdateFailed,
                    "stored refresh token no longer matches",
                ));
            }
        }

        self.write(new_tokens).await
    }
}
