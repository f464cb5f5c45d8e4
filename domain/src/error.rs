//! Error types for the `domain` layer.
use meeting_auth::error::{
    Error as MeetingAuthError, ErrorKind as MeetingAuthErrorKind, OAuthErrorKind,
};
use meeting_auth::ProviderResponse;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error, which for provider
/// rejections ends in a `ProviderResponse` carrying the provider's body.
/// `web` depends on `domain` only and maps the `error_kind`s to HTTP responses.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Storage,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The provider would not issue or refresh a token.
    Auth,
    Scheduling(SchedulingErrorKind),
}

/// Ways the meeting-creation call can fail.
#[derive(Debug, PartialEq)]
pub enum SchedulingErrorKind {
    /// 401 or 403: the access token was not accepted.
    Unauthorized,
    /// Any other 4xx, typically malformed meeting settings.
    Rejected,
    /// 5xx from the provider.
    ProviderUnavailable,
    /// Any other status that is not 201.
    UnexpectedStatus,
    /// 201 without a `join_url`.
    MissingJoinUrl,
    /// 201 with a body that is not JSON.
    InvalidResponse,
}

impl SchedulingErrorKind {
    /// Classifies a non-201 status from the meeting endpoint.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => SchedulingErrorKind::Unauthorized,
            400..=499 => SchedulingErrorKind::Rejected,
            500..=599 => SchedulingErrorKind::ProviderUnavailable,
            _ => SchedulingErrorKind::UnexpectedStatus,
        }
    }
}

impl Error {
    pub fn scheduling(kind: SchedulingErrorKind, response: ProviderResponse) -> Self {
        Error {
            source: Some(Box::new(response)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Scheduling(kind)),
        }
    }

    /// The provider response behind this error, if one caused it.
    pub fn provider_response(&self) -> Option<&ProviderResponse> {
        let mut current: Option<&(dyn StdError + 'static)> = self
            .source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static));

        while let Some(err) = current {
            if let Some(response) = err.downcast_ref::<ProviderResponse>() {
                return Some(response);
            }
            current = err.source();
        }
        None
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Domain Error: {:?}: {}", self.error_kind, source),
            None => write!(f, "Domain Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the request. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build HTTP request".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

// The meeting client sends through the shared middleware client, so its
// transport errors arrive wrapped by `reqwest_middleware`.
impl From<MeetingAuthError> for Error {
    fn from(err: MeetingAuthError) -> Self {
        let error_kind = match &err.error_kind {
            MeetingAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            MeetingAuthErrorKind::OAuth(OAuthErrorKind::InvalidConfiguration) => {
                DomainErrorKind::Internal(InternalErrorKind::Config)
            }
            MeetingAuthErrorKind::OAuth(_) | MeetingAuthErrorKind::Token(_) => {
                DomainErrorKind::External(ExternalErrorKind::Auth)
            }
            MeetingAuthErrorKind::Storage(_) => DomainErrorKind::Internal(InternalErrorKind::Storage),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
