//! OAuth token set as issued by the provider's token endpoint.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// The provider's token response, persisted as the current credential.
///
/// Only `access_token` is required on the wire. Fields this type does not name
/// (Zoom adds `api_url`, for instance) are kept in `extra` and written back
/// unchanged when the set is persisted. The optional fields tolerate `null` and
/// mistyped values, which read as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests.
    #[serde(serialize_with = "expose_secret")]
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_optional_secret",
        deserialize_with = "lenient"
    )]
    pub refresh_token: Option<SecretString>,
    /// Lifetime of the access token in seconds, counted from `obtained_at`.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub expires_in: Option<i64>,
    /// Token type (usually "bearer").
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "lenient")]
    pub token_type: String,
    /// Space-separated granted scopes.
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "lenient")]
    pub scope: String,
    /// When this set was received from the provider.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub obtained_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn expose_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

impl TokenSet {
    /// Creates a token set holding only an access token, stamped as obtained now.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            refresh_token: None,
            expires_in: None,
            token_type: String::new(),
            scope: String::new(),
            obtained_at: Some(Utc::now()),
            extra: Map::new(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(SecretString::new(refresh_token.into()));
        self
    }

    pub fn with_expires_in(mut self, expires_in: i64) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Parses a token endpoint response body and stamps it as obtained now.
    ///
    /// Returns `None` when the body carries no string `access_token`.
    pub fn from_response(body: &Value) -> Option<Self> {
        body.get("access_token")?.as_str()?;
        let mut tokens: TokenSet = serde_json::from_value(body.clone()).ok()?;
        tokens.obtained_at = Some(Utc::now());
        Some(tokens)
    }

    /// When the access token expires, if the provider said so.
    ///
    /// A lifetime too large to represent counts as no known expiry.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let obtained_at = self.obtained_at?;
        let lifetime = chrono::Duration::try_seconds(self.expires_in?)?;
        obtained_at.checked_add_signed(lifetime)
    }

    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if token is expired or will expire within 5 minutes.
    /// A set without a known expiry is never considered expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at()
            .map(|expires| {
                let buffer = chrono::Duration::minutes(5);
                expires <= Utc::now() + buffer
            })
            .unwrap_or(false)
    }

    /// True when `expected` is the refresh token held by this set.
    ///
    /// A `None` expectation matches anything.
    pub fn refresh_token_matches(&self, expected: Option<&str>) -> bool {
        match (expected, &self.refresh_token) {
            (None, _) => true,
            (Some(expected), Some(current)) => current.expose_secret() == expected,
            (Some(_), None) => false,
        }
    }
}

/// Result of a token refresh operation.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    /// The new tokens.
    pub tokens: TokenSet,
    /// True if the refresh token was rotated (Zoom behavior).
    pub refresh_token_rotated: bool,
}

impl RefreshResult {
    /// Create a refresh result with no rotation.
    pub fn no_rotation(tokens: TokenSet) -> Self {
        Self {
            tokens,
            refresh_token_rotated: false,
        }
    }

    /// Create a refresh result with rotation.
    pub fn with_rotation(tokens: TokenSet) -> Self {
        Self {
            tokens,
            refresh_token_rotated: true,
        }
    }
}
