//! OAuth provider trait.

use async_trait::async_trait;

use super::token::{RefreshResult, TokenSet};
use crate::error::Error;

/// Trait for OAuth 2.0 authorization-code providers.
///
/// Implementations handle platform-specific OAuth flows including:
/// - Authorization URL generation
/// - Authorization code exchange for tokens
/// - Token refresh (including rotating refresh tokens for Zoom)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier used in logs (e.g. "zoom").
    fn provider_id(&self) -> &'static str;

    /// Build the URL the user is sent to for consent.
    fn authorization_url(&self) -> Result<String, Error>;

    /// Exchange authorization code for access and refresh tokens.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from OAuth callback
    ///
    /// # Returns
    ///
    /// The token set issued by the provider. A rejection carries the provider's
    /// response body as its source (see `Error::provider_response`).
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, Error>;

    /// Refresh an access token using a refresh token.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - The refresh token
    ///
    /// # Returns
    ///
    /// Refresh result with new tokens and indication if refresh token rotated.
    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResult, Error>;

    /// Returns true if this provider rotates refresh tokens (e.g., Zoom).
    ///
    /// When true, the token manager will use atomic updates to handle token rotation.
    fn uses_rotating_refresh_tokens(&self) -> bool {
        false
    }
}
