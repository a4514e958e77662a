//! Unified error type for the Foodfleet API.
//!
//! Every fallible function in the crate returns [`Result`]. Handlers return the
//! same type and rely on the [`IntoResponse`] implementation below to turn each
//! variant into the status code and JSON body the front end expects.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

/// Field name to list of messages, the shape of a 422 `errors` object.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any error raised by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (image storage, config file, listener)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input failed one or more validation rules
    #[error("The given data was invalid.")]
    Validation {
        /// Messages keyed by field
        errors: FieldErrors,
    },

    /// No row matched the requested key
    #[error("{resource} [{key}] not found")]
    NotFound {
        /// Resource kind, e.g. `"document"`
        resource: &'static str,
        /// The uuid or id that was looked up
        key: String,
    },

    /// Unknown filter, sort or include in the query string
    #[error("{message}")]
    InvalidQuery {
        /// Human readable explanation
        message: String,
    },

    /// A document can only be accepted once
    #[error("Document [{title}] already signed.")]
    AlreadySigned {
        /// Title of the document
        title: String,
    },

    /// Stores attached to an event cannot be deleted
    #[error(
        "This Fleet Member is currently assigned to an Event, please unassign it from the event first."
    )]
    StoreHasEvents,

    /// Request carried no valid bearer token
    #[error("Unauthenticated.")]
    Unauthenticated,

    /// Transport failure while talking to Square
    #[error("Received error while calling Square: {message}")]
    Square {
        /// Underlying error text
        message: String,
    },
}

impl Error {
    /// Builds a validation error for a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self::Validation { errors }
    }

    /// Builds a `NotFound` error.
    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            key: key.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::AlreadySigned { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            Self::StoreHasEvents => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::Square { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::field("body", rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = match self {
            Self::Validation { errors } => json!({
                "message": "The given data was invalid.",
                "errors": errors,
            }),
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::not_found("store", "abc").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::AlreadySigned {
                title: "Contract".to_string()
            }
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::StoreHasEvents.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            Error::field("title", "required").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_already_signed_message() {
        let err = Error::AlreadySigned {
            title: "Permit".to_string(),
        };
        assert_eq!(err.to_string(), "Document [Permit] already signed.");
    }
}
