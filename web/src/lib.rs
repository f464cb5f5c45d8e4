use std::sync::Arc;

use domain::error::Error as DomainError;
use domain::gateway::oauth::{zoom as zoom_oauth, Provider};
use domain::gateway::zoom;
use domain::oauth_token_storage::FileTokenStorage;
use domain::{TokenManager, TokenStorage};
use log::*;
use service::config::Config;
use tokio::net::TcpListener;

mod controller;
mod error;
pub mod router;

pub use error::{Error, Result, WebErrorKind};

/// Shared handles for every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub token_manager: Arc<TokenManager<Arc<dyn TokenStorage>>>,
    pub oauth_provider: Arc<dyn Provider>,
    pub meeting_client: Arc<zoom::Client>,
}

impl AppState {
    /// Wires the Zoom provider and meeting client around `storage`. Both share one
    /// outbound HTTP client.
    pub fn new(
        config: Config,
        storage: Arc<dyn TokenStorage>,
    ) -> core::result::Result<Self, DomainError> {
        let http_client = zoom_oauth::new_http_client(&config)?;
        let oauth_provider = zoom_oauth::new_provider(&config, http_client.clone());
        let meeting_client = zoom::Client::from_config(&config, http_client);

        Ok(Self {
            token_manager: Arc::new(TokenManager::new(storage)),
            oauth_provider: Arc::new(oauth_provider),
            meeting_client: Arc::new(meeting_client),
            config,
        })
    }

    /// Like [`AppState::new`] with tokens persisted to the configured token file.
    pub fn from_config(config: Config) -> core::result::Result<Self, DomainError> {
        let storage = FileTokenStorage::new(config.token_file());
        Self::new(config, Arc::new(storage))
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let listen_addr = format!("{}:{}", interface, app_state.config.port);

    info!("Server starting... listening for connections on http://{listen_addr}");

    let listener = TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, router::define_routes(app_state)).await
}
