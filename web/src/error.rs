use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

/// Failures detected by the web layer itself, before any domain call.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    MissingAuthorizationCode,
    /// The query string could not be parsed; carries the parser's message.
    InvalidQuery(String),
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            error: error.into(),
            details: Some(details),
        }
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// The provider's body when there is one, otherwise the underlying cause.
fn details_of(err: &DomainError) -> serde_json::Value {
    match err.provider_response() {
        Some(response) => response.body.clone(),
        None => serde_json::Value::String(cause_of(err)),
    }
}

fn cause_of(err: &DomainError) -> String {
    err.source()
        .map(|source| source.to_string())
        .unwrap_or_else(|| err.to_string())
}

impl Error {
    fn body(&self) -> ErrorBody {
        match self {
            Error::Web(WebErrorKind::MissingAuthorizationCode) => {
                ErrorBody::new("Missing authorization code")
            }
            Error::Web(WebErrorKind::InvalidQuery(message)) => ErrorBody::with_details(
                "Invalid query string",
                serde_json::Value::String(message.clone()),
            ),
            Error::Domain(err) => match &err.error_kind {
                DomainErrorKind::External(ExternalErrorKind::Auth) => {
                    ErrorBody::with_details("Failed to obtain access token", details_of(err))
                }
                DomainErrorKind::External(ExternalErrorKind::Scheduling(_)) => {
                    ErrorBody::with_details("Failed to schedule meeting", details_of(err))
                }
                _ => ErrorBody::new(cause_of(err)),
            },
        }
    }
}

// Every failure is reported as 500; the body says which stage failed.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Domain(err) => warn!("Request failed: {err}"),
            Error::Web(kind) => warn!("Rejected request: {kind:?}"),
        }

        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.body())).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Error::Domain(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::error::{InternalErrorKind, SchedulingErrorKind};
    use serde_json::json;

    fn domain_error(kind: DomainErrorKind, source: &str) -> DomainError {
        DomainError {
            source: Some(source.to_string().into()),
            error_kind: kind,
        }
    }

    #[test]
    fn test_missing_code_body() {
        let body = Error::Web(WebErrorKind::MissingAuthorizationCode).body();
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"error": "Missing authorization code"})
        );
    }

    #[test]
    fn test_invalid_query_body() {
        let body = Error::Web(WebErrorKind::InvalidQuery("duplicate field `code`".into())).body();
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"error": "Invalid query string", "details": "duplicate field `code`"})
        );
    }

    #[test]
    fn test_auth_error_without_provider_body_reports_cause() {
        let err = Error::Domain(domain_error(
            DomainErrorKind::External(ExternalErrorKind::Auth),
            "No stored tokens",
        ));
        assert_eq!(
            serde_json::to_value(err.body()).unwrap(),
            json!({"error": "Failed to obtain access token", "details": "No stored tokens"})
        );
    }

    #[test]
    fn test_scheduling_error_body() {
        let err = Error::Domain(domain_error(
            DomainErrorKind::External(ExternalErrorKind::Scheduling(
                SchedulingErrorKind::MissingJoinUrl,
            )),
            "no join_url",
        ));
        assert_eq!(err.body().error, "Failed to schedule meeting");
    }

    #[test]
    fn test_other_errors_report_their_cause() {
        let err = Error::Domain(domain_error(
            DomainErrorKind::Internal(InternalErrorKind::Storage),
            "disk full",
        ));
        assert_eq!(err.body(), ErrorBody::new("disk full"));
    }

    #[test]
    fn test_response_status_is_500() {
        let response = Error::Web(WebErrorKind::MissingAuthorizationCode).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
