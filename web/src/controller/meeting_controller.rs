use crate::{AppState, Error};

use axum::extract::State;
use axum::response::{IntoResponse, Redirect};

use domain::oauth_connection;

/// GET /meeting
///
/// Schedules a meeting with the stored token, refreshing it first when it has
/// expired, and redirects to the join URL.
#[utoipa::path(
    get,
    path = "/meeting",
    responses(
        (status = 307, description = "Redirect to the new meeting's join URL"),
        (status = 500, description = "No usable token or scheduling failed"),
    )
)]
pub async fn create(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let join_url = oauth_connection::schedule_with_stored_token(
        &app_state.config,
        app_state.token_manager.as_ref(),
        app_state.oauth_provider.as_ref(),
        &app_state.meeting_client,
    )
    .await?;

    Ok(Redirect::temporary(&join_url))
}
