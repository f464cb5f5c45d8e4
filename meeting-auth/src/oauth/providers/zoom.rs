//! Zoom OAuth provider implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{oauth_error, oauth_rejection, Error, OAuthErrorKind, ProviderResponse};
use crate::http::AuthenticatedClient;
use crate::oauth::token::{RefreshResult, TokenSet};

/// Production Zoom OAuth server.
pub const DEFAULT_BASE_URL: &str = "https://zoom.us";

/// Client credentials registered with Zoom for this app.
///
/// Long-lived process configuration; the secret is only ever exposed to build
/// the Basic authorization header.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

/// Zoom OAuth endpoint URLs.
#[derive(Debug, Clone)]
pub struct Urls {
    pub authorize_url: String,
    pub token_url: String,
}

impl Urls {
    /// Derive the endpoint URLs from the OAuth server's base URL.
    pub fn from_base(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            authorize_url: format!("{base_url}/oauth/authorize"),
            token_url: format!("{base_url}/oauth/token"),
        }
    }
}

impl Default for Urls {
    fn default() -> Self {
        Self::from_base(DEFAULT_BASE_URL)
    }
}

/// Zoom OAuth provider.
///
/// Handles the OAuth 2.0 authorization-code flow for Zoom accounts:
/// - Authorization URL generation
/// - Authorization code exchange (HTTP Basic client authentication, form body)
/// - Token refresh; Zoom issues a new refresh token on every refresh
pub struct Provider {
    credentials: Credentials,
    urls: Urls,
    http_client: AuthenticatedClient,
}

impl Provider {
    /// Create a new Zoom OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Client ID, secret and redirect URI
    /// * `urls` - Authorization and token endpoint URLs
    /// * `http_client` - Shared HTTP client with timeout and retry middleware
    pub fn new(credentials: Credentials, urls: Urls, http_client: AuthenticatedClient) -> Self {
        Self {
            credentials,
            urls,
            http_client,
        }
    }

    /// POST a grant to the token endpoint.
    ///
    /// Only HTTP 200 with an `access_token` in the body counts as success; anything
    /// else is reported as `failure` with the provider's body attached.
    async fn request_tokens(
        &self,
        form: &[(&str, &str)],
        failure: OAuthErrorKind,
    ) -> Result<TokenSet, Error> {
        let response = self
            .http_client
            .post(&self.urls.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Zoom token endpoint: {}", e);
                Error::from(e)
            })?;

        let status = response.status();
        let provider_response = ProviderResponse::from_text(status.as_u16(), response.text().await?);

        if status != StatusCode::OK {
            warn!(
                "Zoom token endpoint returned HTTP {}: {}",
                status, provider_response.body
            );
            return Err(oauth_rejection(failure, provider_response));
        }

        match TokenSet::from_response(&provider_response.body) {
            Some(tokens) => Ok(tokens),
            None => {
                warn!(
                    "Zoom token response has no access_token: {}",
                    provider_response.body
                );
                Err(oauth_rejection(failure, provider_response))
            }
        }
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider_id(&self) -> &'static str {
        "zoom"
    }

    fn authorization_url(&self) -> Result<String, Error> {
        let url = Url::parse_with_params(
            &self.urls.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| {
            oauth_error(
                OAuthErrorKind::InvalidConfiguration,
                &format!("Invalid Zoom authorize URL: {e}"),
            )
        })?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, Error> {
        debug!("Exchanging Zoom authorization code for tokens");

        let tokens = self
            .request_tokens(
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ],
                OAuthErrorKind::TokenExchangeFailed,
            )
            .await?;

        info!("Successfully exchanged Zoom authorization code for tokens");
        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResult, Error> {
        debug!("Refreshing Zoom access token");

        let mut tokens = self
            .request_tokens(
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ],
                OAuthErrorKind::TokenRefreshFailed,
            )
            .await?;

        info!("Successfully refreshed Zoom access token");

        match &tokens.refresh_token {
            Some(new_refresh) if new_refresh.expose_secret() != refresh_token => {
                Ok(RefreshResult::with_rotation(tokens))
            }
            Some(_) => Ok(RefreshResult::no_rotation(tokens)),
            None => {
                // Keep the old refresh token usable when none is returned.
                tokens.refresh_token = Some(SecretString::new(refresh_token.to_string()));
                Ok(RefreshResult::no_rotation(tokens))
            }
        }
    }

    fn uses_rotating_refresh_tokens(&self) -> bool {
        true
    }
}
