//! Zoom REST API client for creating meetings.

use crate::error::{Error, SchedulingErrorKind};
use crate::meeting::MeetingRequest;
use log::*;
use meeting_auth::http::AuthenticatedClient;
use meeting_auth::ProviderResponse;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use service::config::Config;

/// Zoom meetings API client
pub struct Client {
    http_client: AuthenticatedClient,
    base_url: String,
    user_id: String,
}

impl Client {
    /// Create a client for `base_url` (e.g. `https://api.zoom.us/v2`) that schedules
    /// meetings for `user_id` (`me` is the authorizing user).
    pub fn new(http_client: AuthenticatedClient, base_url: &str, user_id: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        }
    }

    pub fn from_config(config: &Config, http_client: AuthenticatedClient) -> Self {
        Self::new(http_client, config.zoom_api_base_url(), config.zoom_user_id())
    }

    /// Create a meeting and return its join URL.
    ///
    /// Only HTTP 201 is success. Every other outcome is a typed scheduling error
    /// with the provider's response attached.
    pub async fn create_meeting(
        &self,
        access_token: &SecretString,
        request: &MeetingRequest,
    ) -> Result<String, Error> {
        let url = format!("{}/users/{}/meetings", self.base_url, self.user_id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Zoom meetings API: {:?}", e);
                Error::from(meeting_auth::Error::from(e))
            })?;

        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::CREATED {
            let provider_response = ProviderResponse::from_text(status.as_u16(), text);
            warn!("Failed to schedule meeting: {}", provider_response);
            return Err(Error::scheduling(
                SchedulingErrorKind::from_status(status.as_u16()),
                provider_response,
            ));
        }

        let body: serde_json::Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => {
                warn!("Zoom meetings API returned a non-JSON body: {:?}", e);
                return Err(Error::scheduling(
                    SchedulingErrorKind::InvalidResponse,
                    ProviderResponse::from_text(status.as_u16(), text),
                ));
            }
        };

        match body.get("join_url").and_then(|url| url.as_str()) {
            Some(join_url) => {
                info!(
                    "Created Zoom meeting {}",
                    body.get("id").map(|id| id.to_string()).unwrap_or_default()
                );
                Ok(join_url.to_string())
            }
            None => {
                warn!("Zoom meeting response has no join_url");
                Err(Error::scheduling(
                    SchedulingErrorKind::MissingJoinUrl,
                    ProviderResponse::new(status.as_u16(), body),
                ))
            }
        }
    }
}
