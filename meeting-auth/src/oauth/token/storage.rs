//! Token storage trait for persisting the current OAuth token set.

use std::sync::Arc;

use async_trait::async_trait;

use super::TokenSet;
use crate::error::Error;

/// Trait for storing and retrieving the single, process-wide OAuth token set.
///
/// Implementations must make `save` an all-or-nothing overwrite: a `load` that races
/// a `save` sees either the previous set or the new one, never a mix.
///
/// Implementations should:
/// - Write to a temporary location and swap it in (e.g. write-then-rename for files)
/// - Serialize concurrent writers
/// - Support atomic updates for Zoom's rotating refresh tokens
#[async_trait]
pub trait Storage: Send + Sync {
    /// Retrieve the current token set.
    ///
    /// # Returns
    ///
    /// `None` when nothing has been stored yet or the stored record cannot be read,
    /// so a first run behaves the same as a run after a corrupted write.
    async fn load(&self) -> Option<TokenSet>;

    /// Replace the current token set.
    ///
    /// # Arguments
    ///
    /// * `tokens` - The tokens to store
    async fn save(&self, tokens: &TokenSet) -> Result<(), Error>;

    /// Atomically replace the token set if the old refresh token still matches.
    ///
    /// CRITICAL for Zoom's rotating refresh tokens. Once a refresh token has been
    /// exchanged it is dead, so a writer holding a stale one must not clobber the set
    /// another writer just obtained.
    ///
    /// # Arguments
    ///
    /// * `old_refresh` - Expected current refresh token (for compare-and-swap)
    /// * `new_tokens` - The new tokens to store
    ///
    /// # Returns
    ///
    /// `Ok(())` if the update succeeded or nothing was stored yet, `Err` with
    /// `StorageErrorKind::AtomicUpdateFailed` if the stored refresh token differs.
    async fn update_atomic(
        &self,
        old_refresh: Option<&str>,
        new_tokens: &TokenSet,
    ) -> Result<(), Error>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn load(&self) -> Option<TokenSet> {
        (**self).load().await
    }

    async fn save(&self, tokens: &TokenSet) -> Result<(), Error> {
        (**self).save(tokens).await
    }

    async fn update_atomic(
        &self,
        old_refresh: Option<&str>,
        new_tokens: &TokenSet,
    ) -> Result<(), Error> {
        (**self).update_atomic(old_refresh, new_tokens).await
    }
}
