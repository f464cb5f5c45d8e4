//! Token lifecycle manager: code exchange, refresh and persistence.

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Storage, TokenSet};
use crate::error::{token_error, Error, TokenErrorKind};
use crate::oauth::Provider;

/// Coordinates provider token calls with the token store.
///
/// The store holds a single current token set. All refreshes go through one
/// lock: with rotating refresh tokens, two concurrent refreshes would both
/// present the same refresh token and the loser would invalidate the winner's
/// freshly stored set.
pub struct Manager<S: Storage> {
    storage: S,
    refresh_lock: Mutex<()>,
}

impl<S: Storage> Manager<S> {
    /// Create a new token manager with the given storage backend.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Exchange an authorization code and persist the issued token set.
    ///
    /// A provider rejection is returned unchanged so the caller can surface the
    /// provider's response body.
    pub async fn exchange_code<P: Provider + ?Sized>(
        &self,
        provider: &P,
        code: &str,
    ) -> Result<TokenSet, Error> {
        let tokens = provider.exchange_code(code).await?;
        self.storage.save(&tokens).await?;

        info!(
            "Stored new {} token set (expires in {:?}s)",
            provider.provider_id(),
            tokens.expires_in
        );
        Ok(tokens)
    }

    /// Trade `refresh_token` for a new access token.
    ///
    /// The new set is persisted only when the provider accepts the refresh; on
    /// any failure the stored set is left as it was.
    pub async fn refresh<P: Provider + ?Sized>(
        &self,
        provider: &P,
        refresh_token: &str,
    ) -> Result<SecretString, Error> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked(provider, refresh_token).await
    }

    /// Return a usable access token, refreshing the stored set if it expired.
    ///
    /// # Returns
    ///
    /// The access token, `TokenErrorKind::NotFound` when nothing is stored, or
    /// `TokenErrorKind::Refresh` when the expired set has no refresh token.
    pub async fn get_valid_token<P: Provider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<SecretString, Error> {
        let tokens = self.stored_tokens().await?;
        if !tokens.is_expired() {
            return Ok(tokens.access_token);
        }

        debug!("Stored {} token expired, refreshing", provider.provider_id());
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        let tokens = self.stored_tokens().await?;
        if !tokens.is_expired() {
            debug!("Token was refreshed by another request");
            return Ok(tokens.access_token);
        }

        let refresh_token = tokens
            .refresh_token
            .ok_or_else(|| token_error(TokenErrorKind::Refresh, "No refresh token available"))?;

        self.refresh_locked(provider, refresh_token.expose_secret())
            .await
    }

    /// The currently stored token set, if any.
    pub async fn load_tokens(&self) -> Option<TokenSet> {
        self.storage.load().await
    }

    async fn stored_tokens(&self) -> Result<TokenSet, Error> {
        self.storage
            .load()
            .await
            .ok_or_else(|| token_error(TokenErrorKind::NotFound, "No stored tokens"))
    }

    // Caller must hold `refresh_lock`.
    async fn refresh_locked<P: Provider + ?Sized>(
        &self,
        provider: &P,
        refresh_token: &str,
    ) -> Result<SecretString, Error> {
        let result = provider.refresh_token(refresh_token).await.map_err(|e| {
            warn!("{} token refresh failed: {}", provider.provider_id(), e);
            e
        })?;

        if result.refresh_token_rotated && provider.uses_rotating_refresh_tokens() {
            debug!("Refresh token rotated, using atomic update");
            self.storage
                .update_atomic(Some(refresh_token), &result.tokens)
                .await?;
        } else {
            self.storage.save(&result.tokens).await?;
        }

        info!("Refreshed {} access token", provider.provider_id());
        Ok(result.tokens.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{oauth_rejection, ErrorKind, OAuthErrorKind, ProviderResponse};
    use crate::oauth::token::{MemoryStorage, RefreshResult};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider double: accepts code "good" and refresh token "ref1" only.
    #[derive(Default)]
    struct StubProvider {
        refresh_calls: AtomicUsize,
    }

    fn rejected(kind: OAuthErrorKind) -> Error {
        oauth_rejection(
            kind,
            ProviderResponse::new(400, json!({"error": "invalid_grant"})),
        )
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn provider_id(&self) -> &'static str {
            "stub"
        }

        fn authorization_url(&self) -> Result<String, Error> {
            Ok("https://stub.test/authorize".to_string())
        }

        async fn exchange_code(&self, code: &str) -> Result<TokenSet, Error> {
            if code == "good" {
                Ok(TokenSet::new("tok1")
                    .with_refresh_token("ref1")
                    .with_expires_in(3600))
            } else {
                Err(rejected(OAuthErrorKind::TokenExchangeFailed))
            }
        }

        async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResult, Error> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if refresh_token == "ref1" {
                Ok(RefreshResult::with_rotation(
                    TokenSet::new("tok2")
                        .with_refresh_token("ref2")
                        .with_expires_in(3600),
                ))
            } else {
                Err(rejected(OAuthErrorKind::TokenRefreshFailed))
            }
        }

        fn uses_rotating_refresh_tokens(&self) -> bool {
            true
        }
    }

    fn expired_tokens() -> TokenSet {
        let mut tokens = TokenSet::new("stale")
            .with_refresh_token("ref1")
            .with_expires_in(3600);
        tokens.obtained_at = Some(Utc::now() - Duration::hours(2));
        tokens
    }

    #[tokio::test]
    async fn test_exchange_code_persists_tokens() {
        let manager = Manager::new(MemoryStorage::new());

        let tokens = manager
            .exchange_code(&StubProvider::default(), "good")
            .await
            .unwrap();

        assert_eq!(tokens.access_token.expose_secret(), "tok1");
        let stored = manager.load_tokens().await.unwrap();
        assert_eq!(stored.access_token.expose_secret(), "tok1");
    }

    #[tokio::test]
    async fn test_exchange_code_rejection_keeps_store_empty() {
        let manager = Manager::new(MemoryStorage::new());

        let err = manager
            .exchange_code(&StubProvider::default(), "bad")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
        assert!(err.provider_response().is_some());
        assert!(manager.load_tokens().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_persists_rotated_tokens() {
        let manager = Manager::new(MemoryStorage::with_tokens(expired_tokens()));

        let access = manager
            .refresh(&StubProvider::default(), "ref1")
            .await
            .unwrap();

        assert_eq!(access.expose_secret(), "tok2");
        let stored = manager.load_tokens().await.unwrap();
        assert!(stored.refresh_token_matches(Some("ref2")));
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_stored_tokens_unchanged() {
        let manager = Manager::new(MemoryStorage::with_tokens(
            TokenSet::new("tok1").with_refresh_token("ref1"),
        ));

        let result = manager.refresh(&StubProvider::default(), "revoked").await;

        assert!(result.is_err());
        assert!(result.ok().is_none());
        let stored = manager.load_tokens().await.unwrap();
        assert_eq!(stored.access_token.expose_secret(), "tok1");
        assert!(stored.refresh_token_matches(Some("ref1")));
    }

    #[tokio::test]
    async fn test_get_valid_token_without_stored_tokens() {
        let manager = Manager::new(MemoryStorage::new());

        let err = manager
            .get_valid_token(&StubProvider::default())
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Token(TokenErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_get_valid_token_returns_fresh_token_without_refresh() {
        let provider = StubProvider::default();
        let manager = Manager::new(MemoryStorage::with_tokens(
            TokenSet::new("tok1")
                .with_refresh_token("ref1")
                .with_expires_in(3600),
        ));

        let access = manager.get_valid_token(&provider).await.unwrap();

        assert_eq!(access.expose_secret(), "tok1");
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_valid_token_refreshes_expired_tokens() {
        let provider = StubProvider::default();
        let manager = Manager::new(MemoryStorage::with_tokens(expired_tokens()));

        let access = manager.get_valid_token(&provider).await.unwrap();

        assert_eq!(access.expose_secret(), "tok2");
        let stored = manager.load_tokens().await.unwrap();
        assert_eq!(stored.access_token.expose_secret(), "tok2");
        assert!(stored.refresh_token_matches(Some("ref2")));
    }

    #[tokio::test]
    async fn test_get_valid_token_expired_without_refresh_token() {
        let mut tokens = TokenSet::new("stale").with_expires_in(60);
        tokens.obtained_at = Some(Utc::now() - Duration::hours(1));
        let manager = Manager::new(MemoryStorage::with_tokens(tokens));

        let err = manager
            .get_valid_token(&StubProvider::default())
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Token(TokenErrorKind::Refresh));
    }

    #[tokio::test]
    async fn test_concurrent_callers_refresh_once() {
        let provider = Arc::new(StubProvider::default());
        let manager = Arc::new(Manager::new(MemoryStorage::with_tokens(expired_tokens())));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let provider = provider.clone();
                let manager = manager.clone();
                tokio::spawn(async move { manager.get_valid_token(provider.as_ref()).await })
            })
            .collect();

        for handle in handles {
            let access = handle.await.unwrap().unwrap();
            assert_eq!(access.expose_secret(), "tok2");
        }
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }
}
