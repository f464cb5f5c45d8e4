//! Controller for the Zoom OAuth flow.
//!
//! Both endpoints are reached through browser redirects, so failures are reported
//! as a JSON body on a 500 rather than redirected anywhere.

use crate::{AppState, Error};

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect};

use domain::oauth_connection;
use serde::Deserialize;

use crate::error::WebErrorKind;

/// Query parameters for OAuth callback
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
}

/// GET /
///
/// Starts the flow by redirecting to Zoom's authorization endpoint.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 307, description = "Redirect to Zoom OAuth"),
        (status = 500, description = "Authorization URL could not be built"),
    )
)]
pub async fn authorize(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let url = oauth_connection::authorize_url(app_state.oauth_provider.as_ref())?;
    Ok(Redirect::temporary(&url))
}

/// GET /callback
///
/// Handles the redirect back from Zoom: exchanges the code, stores the tokens,
/// schedules a meeting and redirects to its join URL.
#[utoipa::path(
    get,
    path = "/callback",
    params(
        ("code" = String, Query, description = "Authorization code from Zoom"),
    ),
    responses(
        (status = 307, description = "Redirect to the new meeting's join URL"),
        (status = 500, description = "Missing or malformed code, token exchange or scheduling failed"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    query: Result<Query<OAuthCallback>, QueryRejection>,
) -> Result<impl IntoResponse, Error> {
    let Query(params) =
        query.map_err(|rejection| Error::Web(WebErrorKind::InvalidQuery(rejection.body_text())))?;
    let code = params
        .code
        .ok_or(Error::Web(WebErrorKind::MissingAuthorizationCode))?;

    let join_url = oauth_connection::exchange_and_schedule(
        &app_state.config,
        app_state.token_manager.as_ref(),
        app_state.oauth_provider.as_ref(),
        &app_state.meeting_client,
        &code,
    )
    .await?;

    Ok(Redirect::temporary(&join_url))
}
