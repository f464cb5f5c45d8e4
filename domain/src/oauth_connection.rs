//! The operations behind the relay's HTTP entry points.

use crate::error::Error;
use crate::gateway::oauth::Provider;
use crate::gateway::zoom;
use crate::meeting;
use log::*;
use meeting_auth::oauth::token::{Manager, Storage};
use service::config::Config;

/// Build the Zoom authorization URL the user is redirected to for consent.
pub fn authorize_url(provider: &dyn Provider) -> Result<String, Error> {
    let url = provider.authorization_url()?;
    info!("Redirecting user to {} OAuth", provider.provider_id());
    Ok(url)
}

/// Exchange an authorization code, persist the tokens and schedule a meeting.
///
/// Returns the join URL of the new meeting.
pub async fn exchange_and_schedule<S: Storage>(
    config: &Config,
    token_manager: &Manager<S>,
    provider: &dyn Provider,
    meeting_client: &zoom::Client,
    authorization_code: &str,
) -> Result<String, Error> {
    info!("Processing {} OAuth callback", provider.provider_id());

    let tokens = token_manager
        .exchange_code(provider, authorization_code)
        .await
        .inspect_err(|e| warn!("Failed to exchange OAuth code: {}", e))?;

    meeting::schedule_meeting(config, meeting_client, &tokens.access_token).await
}

/// Schedule a meeting with the stored token, refreshing it first if it expired.
pub async fn schedule_with_stored_token<S: Storage>(
    config: &Config,
    token_manager: &Manager<S>,
    provider: &dyn Provider,
    meeting_client: &zoom::Client,
) -> Result<String, Error> {
    let access_token = token_manager
        .get_valid_token(provider)
        .await
        .inspect_err(|e| warn!("No usable stored token: {}", e))?;

    meeting::schedule_meeting(config, meeting_client, &access_token).await
}
