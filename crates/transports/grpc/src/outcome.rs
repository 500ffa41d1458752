//! Classified result of a single unary call

use std::fmt;
use tonic::{Code, Status};

/// Error kinds the caller is expected to handle explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested resource does not exist (recoverable, not an application fault)
    NotFound,
    /// Caller-initiated cancellation or an expired deadline
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => f.write_str("NotFound"),
            ErrorKind::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Exactly one of success, a classified error, or an unclassified failure
///
/// A call never yields a partial response: `Success` carries the complete decoded
/// message and the error variants carry none.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Classified { kind: ErrorKind, message: String },
    /// Any other remote or transport failure, surfaced verbatim
    Unclassified { code: Code, message: String },
}

impl<T> Outcome<T> {
    /// Classify a terminal gRPC status
    pub fn from_status(status: &Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::NotFound => Outcome::Classified {
                kind: ErrorKind::NotFound,
                message,
            },
            Code::Cancelled | Code::DeadlineExceeded => Outcome::Classified {
                kind: ErrorKind::Cancelled,
                message,
            },
            code => Outcome::Unclassified { code, message },
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Outcome::Classified {
            kind: ErrorKind::Cancelled,
            message: message.into(),
        }
    }

    pub fn failure(code: Code, message: impl Into<String>) -> Self {
        Outcome::Unclassified {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }

    /// Classified kind, if any
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Classified { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Error message for either error variant
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Classified { message, .. } | Outcome::Unclassified { message, .. } => {
                Some(message)
            }
        }
    }

    /// The response, discarding error details
    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Classified { kind, message } => Outcome::Classified { kind, message },
            Outcome::Unclassified { code, message } => Outcome::Unclassified { code, message },
        }
    }
}

impl<T> From<Result<T, Status>> for Outcome<T> {
    fn from(result: Result<T, Status>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(status) => Outcome::from_status(&status),
        }
    }
}
