//! Error taxonomy for the group service
//!
//! This module defines the error vocabulary for each layer:
//! - `ErrorKind`: fixed set of client-facing categories, each bound to a wire status code
//! - `ServiceError`: errors built by the service layer with client-safe text
//! - `AppError`: everything that can reach the transport boundary
//! - `Status`: the wire-level error sent to callers
//! - `StoreError`: group store adapter failures

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Replaces the text of an `Internal` error that was not built with `wrap_error`
const INTERNAL_MESSAGE: &str = "internal server error";
/// Replaces the text of anything that did not come from this taxonomy
const UNKNOWN_MESSAGE: &str = "unknown error";

/// Client-facing error category
///
/// Codes follow the gRPC numbering so callers can treat them as canonical status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Catch-all for errors from an unknown error space
    Unknown,
    /// The caller supplied a malformed or missing argument
    InvalidArgument,
    /// The requested entity does not exist
    NotFound,
    /// The entity the caller tried to create already exists
    AlreadyExists,
    /// The caller is identified but not allowed to perform the operation
    PermissionDenied,
    /// The operation was aborted, typically by a concurrency conflict
    Aborted,
    /// An invariant of the underlying system is broken
    Internal,
    /// The service is temporarily unavailable
    Unavailable,
    /// The request carries no valid credentials
    Unauthenticated,
}

impl ErrorKind {
    #[cfg(test)]
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::Unknown,
        ErrorKind::InvalidArgument,
        ErrorKind::NotFound,
        ErrorKind::AlreadyExists,
        ErrorKind::PermissionDenied,
        ErrorKind::Aborted,
        ErrorKind::Internal,
        ErrorKind::Unavailable,
        ErrorKind::Unauthenticated,
    ];

    /// Wire status code for this category
    pub const fn code(self) -> i32 {
        match self {
            ErrorKind::Unknown => 2,
            ErrorKind::InvalidArgument => 3,
            ErrorKind::NotFound => 5,
            ErrorKind::AlreadyExists => 6,
            ErrorKind::PermissionDenied => 7,
            ErrorKind::Aborted => 10,
            ErrorKind::Internal => 13,
            ErrorKind::Unavailable => 14,
            ErrorKind::Unauthenticated => 16,
        }
    }

    /// Category bound to a wire status code, if the code belongs to the taxonomy
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            2 => Some(ErrorKind::Unknown),
            3 => Some(ErrorKind::InvalidArgument),
            5 => Some(ErrorKind::NotFound),
            6 => Some(ErrorKind::AlreadyExists),
            7 => Some(ErrorKind::PermissionDenied),
            10 => Some(ErrorKind::Aborted),
            13 => Some(ErrorKind::Internal),
            14 => Some(ErrorKind::Unavailable),
            16 => Some(ErrorKind::Unauthenticated),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unknown => "UNKNOWN",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::Aborted => "ABORTED",
            ErrorKind::Internal => "INTERNAL",
            ErrorKind::Unavailable => "UNAVAILABLE",
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    /// HTTP status used when the category is carried over HTTP
    pub const fn http_status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists | ErrorKind::Aborted => StatusCode::CONFLICT,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Unknown | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error built by the service layer
///
/// The message is the only text that may ever reach the caller. Causes handed to
/// `wrap_error` are logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    wrapped: bool,
}

#[cfg(test)]
impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }
}

/// Build an error whose message is safe to show to the caller
pub fn build_error(kind: ErrorKind, message: impl Into<String>) -> ServiceError {
    ServiceError {
        kind,
        message: message.into(),
        wrapped: false,
    }
}

/// Log `cause` and build an error that exposes only `client_message`
pub fn wrap_error(
    kind: ErrorKind,
    client_message: impl Into<String>,
    cause: impl fmt::Display,
) -> ServiceError {
    let message = client_message.into();
    tracing::error!(kind = %kind, error = %cause, "{}", message);
    ServiceError {
        kind,
        message,
        wrapped: true,
    }
}

/// Errors that can reach the transport boundary
#[derive(Debug, Error)]
pub enum AppError {
    /// Built by this service through the taxonomy
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Wire status received from another service
    #[error(transparent)]
    Remote(#[from] Status),

    /// Anything else, e.g. a bug in a collaborator
    #[error(transparent)]
    Foreign(#[from] anyhow::Error),
}

/// Check whether `err` belongs to the given category
///
/// Foreign errors carry no category and count as `Unknown`.
pub fn is_kind(err: &AppError, kind: ErrorKind) -> bool {
    match err {
        AppError::Service(e) => e.kind == kind,
        AppError::Remote(status) => status.code == kind.code(),
        AppError::Foreign(_) => kind == ErrorKind::Unknown,
    }
}

/// Wire-level error returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status {code}: {message}")]
pub struct Status {
    code: i32,
    message: String,
}

impl Status {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::with_code(kind.code(), message)
    }

    /// Status carrying a raw code, e.g. one received from a remote service
    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(self.code)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        if err.kind == ErrorKind::Internal && !err.wrapped {
            Status::new(ErrorKind::Internal, INTERNAL_MESSAGE)
        } else {
            Status::new(err.kind, err.message)
        }
    }
}

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Service(e) => e.into(),
            AppError::Remote(status) => {
                tracing::warn!(code = status.code, "Unclassified remote status reached the boundary");
                Status::new(ErrorKind::Unknown, UNKNOWN_MESSAGE)
            }
            AppError::Foreign(e) => {
                tracing::error!(error = %e, "Unclassified error reached the boundary");
                Status::new(ErrorKind::Unknown, UNKNOWN_MESSAGE)
            }
        }
    }
}

/// Convert a service result into its wire-level form
///
/// Success passes through untouched. Errors caused by the caller are logged at
/// debug level, everything else was already logged where it was built.
pub fn to_status<T>(result: Result<T, AppError>) -> Result<T, Status> {
    result.map_err(|err| {
        if is_kind(&err, ErrorKind::InvalidArgument) || is_kind(&err, ErrorKind::NotFound) {
            tracing::debug!(error = %err, "Request rejected");
        }
        Status::from(err)
    })
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct StatusBody<'a> {
    code: i32,
    status: &'static str,
    message: &'a str,
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        let kind = self.kind().unwrap_or(ErrorKind::Unknown);
        let body = Json(StatusBody {
            code: self.code,
            status: kind.as_str(),
            message: &self.message,
        });

        (kind.http_status(), body).into_response()
    }
}

/// Group store adapter errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Connection error: {0}")]
    Connection(String),
}
