//! Zoom OAuth client.
//!
//! Provides a configured Zoom OAuth provider for the domain operations.

use meeting_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder, HttpClientConfig};
use meeting_auth::oauth::providers::zoom::{Credentials, Provider as ZoomProvider, Urls};
use service::config::Config;

use crate::error::Error;

/// Builds the shared outbound HTTP client from the configured timeout and retry budget.
pub fn new_http_client(config: &Config) -> Result<AuthenticatedClient, Error> {
    let client = AuthenticatedClientBuilder::new()
        .with_config(HttpClientConfig::new(
            config.http_timeout(),
            config.http_max_retries,
        ))
        .build()?;
    Ok(client)
}

/// Create a new Zoom OAuth provider.
///
/// Missing client settings are passed through as empty strings; Zoom rejects
/// the resulting requests and that rejection is what the caller sees.
///
/// # Example
///
/// ```rust,ignore
/// use domain::gateway::oauth::zoom;
///
/// let http_client = zoom::new_http_client(&config)?;
/// let provider = zoom::new_provider(&config, http_client);
/// ```
pub fn new_provider(config: &Config, http_client: AuthenticatedClient) -> ZoomProvider {
    let credentials = Credentials {
        client_id: config.client_id().to_string(),
        client_secret: config.client_secret(),
        redirect_uri: config.redirect_uri().to_string(),
    };

    ZoomProvider::new(
        credentials,
        Urls::from_base(config.zoom_oauth_base_url()),
        http_client,
    )
}
