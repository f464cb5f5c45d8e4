//! In-memory token storage.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Storage, TokenSet};
use crate::error::{storage_error, Error, StorageErrorKind};

/// Token storage that keeps the current set in process memory.
///
/// Nothing survives a restart; useful as a test double and for throwaway runs.
#[derive(Default)]
pub struct MemoryStorage {
    tokens: Mutex<Option<TokenSet>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with `tokens`.
    pub fn with_tokens(tokens: TokenSet) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self) -> Option<TokenSet> {
        self.tokens.lock().await.clone()
    }

    async fn save(&self, tokens: &TokenSet) -> Result<(), Error> {
        *self.tokens.lock().await = Some(tokens.clone());
        Ok(())
    }

    async fn update_atomic(
        &self,
        old_refresh: Option<&str>,
        new_tokens: &TokenSet,
    ) -> Result<(), Error> {
        let mut current = self.tokens.lock().await;

        if let Some(stored) = current.as_ref() {
            if !stored.refresh_token_matches(old_refresh) {
                return Err(storage_error(
                    StorageErrorKind::AtomicUpdateFailed,
                    "refresh token was rotated by another writer",
                ));
            }
        }

        *current = Some(new_tokens.clone());
        Ok(())
    }
}
