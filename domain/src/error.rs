//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in the backends it talks to. The `source` field holds the original error that caused
/// the domain error, so callers can report the whole chain without depending on `reqwest`.
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

/// Errors raised before anything leaves the process.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// Caller-supplied input failed validation; the message names the offending field.
    Validation(String),
    Other(String),
}

/// Errors reported by, or on the way to, the matching backend.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The backend answered with a non-success HTTP status.
    Status(u16),
    Other(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(message.into())),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Validation(msg)) => {
                write!(f, "Invalid request: {msg}")
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(msg)) => write!(f, "{msg}"),
            DomainErrorKind::External(ExternalErrorKind::Network) => match &self.source {
                Some(source) => write!(f, "Network error: {source}"),
                None => write!(f, "Network error"),
            },
            DomainErrorKind::External(ExternalErrorKind::Status(code)) => {
                write!(f, "Matching request failed: HTTP {code}")
            }
            DomainErrorKind::External(ExternalErrorKind::Other(msg)) => write!(f, "{msg}"),
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
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // The backend answered but the body was not the shape we expected.
        } else if err.is_decode() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                    "Unexpected response body from matching backend".to_string(),
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
