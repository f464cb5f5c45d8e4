use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use secrecy::SecretString;
use std::convert::Infallible;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default base URL of the Zoom OAuth authorization server.
pub const DEFAULT_ZOOM_OAUTH_BASE_URL: &str = "https://zoom.us";

/// Default base URL of the Zoom REST API.
pub const DEFAULT_ZOOM_API_BASE_URL: &str = "https://api.zoom.us/v2";

/// Default location of the persisted token set.
pub const DEFAULT_TOKEN_FILE: &str = "zoom_tokens.json";

fn parse_secret(value: &str) -> Result<SecretString, Infallible> {
    Ok(SecretString::new(value.to_string()))
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The OAuth client ID issued by Zoom for this app.
    #[arg(long, env)]
    client_id: Option<String>,

    /// The OAuth client secret issued by Zoom for this app.
    #[arg(long, env, value_parser = parse_secret, hide_env_values = true)]
    client_secret: Option<SecretString>,

    /// The redirect URI registered with Zoom; must point at this server's /callback route.
    #[arg(long, env)]
    redirect_uri: Option<String>,

    /// Base URL of the Zoom OAuth server (authorize and token endpoints live beneath it).
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_ZOOM_OAUTH_BASE_URL)]
    zoom_oauth_base_url: String,

    /// Base URL of the Zoom REST API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_ZOOM_API_BASE_URL)]
    zoom_api_base_url: String,

    /// The Zoom user meetings are created for. "me" is the user who granted consent.
    #[arg(long, env, default_value = "me")]
    zoom_user_id: String,

    /// Path of the JSON file holding the current OAuth token set
    #[arg(long, env, default_value = DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,

    /// Timeout in seconds applied to every outbound HTTP request
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Maximum number of retries for transient outbound HTTP failures
    #[arg(long, env, default_value_t = 3)]
    pub http_max_retries: u32,

    /// Topic of the meetings created by the relay
    #[arg(long, env, default_value = "Automated Meeting")]
    meeting_topic: String,

    /// Agenda of the meetings created by the relay
    #[arg(long, env, default_value = "This is an automated meeting")]
    meeting_agenda: String,

    /// Duration in minutes of the meetings created by the relay
    #[arg(long, env, default_value_t = 60)]
    pub meeting_duration_minutes: u32,

    /// Timezone the meeting start time is displayed in
    #[arg(long, env, default_value = "UTC")]
    meeting_timezone: String,

    /// How many minutes after the request a scheduled meeting starts
    #[arg(long, env, default_value_t = 60)]
    pub meeting_lead_time_minutes: u32,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 3000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Parses an explicit argument list instead of the process arguments. The first
    /// item is the binary name, as with `std::env::args`.
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Config::try_parse_from(args)
    }

    /// Returns the OAuth client ID, or an empty string when none is configured.
    pub fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or_default()
    }

    /// Returns the OAuth client secret, or an empty secret when none is configured.
    pub fn client_secret(&self) -> SecretString {
        self.client_secret
            .clone()
            .unwrap_or_else(|| SecretString::new(String::new()))
    }

    /// Returns the OAuth redirect URI, or an empty string when none is configured.
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uri.as_deref().unwrap_or_default()
    }

    /// Names of the required OAuth settings that are not configured.
    ///
    /// Missing settings are not fatal: the relay still starts and the provider
    /// rejects the malformed requests it sends.
    pub fn missing_oauth_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.client_id.is_none() {
            missing.push("CLIENT_ID");
        }
        if self.client_secret.is_none() {
            missing.push("CLIENT_SECRET");
        }
        if self.redirect_uri.is_none() {
            missing.push("REDIRECT_URI");
        }
        missing
    }

    pub fn zoom_oauth_base_url(&self) -> &str {
        self.zoom_oauth_base_url.trim_end_matches('/')
    }

    pub fn zoom_api_base_url(&self) -> &str {
        self.zoom_api_base_url.trim_end_matches('/')
    }

    pub fn zoom_user_id(&self) -> &str {
        &self.zoom_user_id
    }

    pub fn token_file(&self) -> &Path {
        &self.token_file
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn meeting_topic(&self) -> &str {
        &self.meeting_topic
    }

    pub fn meeting_agenda(&self) -> &str {
        &self.meeting_agenda
    }

    pub fn meeting_timezone(&self) -> &str {
        &self.meeting_timezone
    }
}
