/**
 * Hub Error Types
 *
 * This module defines the error taxonomy for the messaging core.
 *
 * # Error Categories
 *
 * - `InvalidRequest` - malformed or missing required fields (missing peer
 *   identifier, self-addressed message). Rejected synchronously, no state
 *   mutated.
 * - `NotFound` - an unknown username. Rejected synchronously, no state
 *   mutated.
 * - `Persistence` - a group or message store write failed. The triggering
 *   operation fails and nothing is broadcast; broadcast happens strictly
 *   after a successful persist.
 *
 * Disconnect-path and notification-dispatch failures are deliberately not
 * part of this taxonomy: they are logged and swallowed at the call site, so
 * cleanup can never be blocked by a server-side error.
 */
use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced by hub operations
#[derive(Debug, Error)]
pub enum HubError {
    /// Malformed or missing required fields in a client request
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Human-readable error message
        message: String,
    },

    /// A referenced user does not exist
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// The group or message store failed to persist a write
    #[error("persistence error: {message}")]
    Persistence {
        /// Human-readable error message
        message: String,
    },
}

impl HubError {
    /// Create a new invalid-request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// HTTP status code equivalent for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code carried in `error` wire events
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid-request",
            Self::NotFound { .. } => "not-found",
            Self::Persistence { .. } => "persistence-error",
        }
    }
}

impl From<sqlx::Error> for HubError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_error() {
        let error = HubError::invalid_request("missing peer");
        match error {
            HubError::InvalidRequest { message } => assert_eq!(message, "missing peer"),
            _ => panic!("Expected InvalidRequest"),
        }
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            HubError::invalid_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(HubError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            HubError::persistence("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(HubError::invalid_request("x").code(), "invalid-request");
        assert_eq!(HubError::not_found("x").code(), "not-found");
        assert_eq!(HubError::persistence("x").code(), "persistence-error");
    }

    #[test]
    fn test_from_sqlx_error() {
        let error: HubError = sqlx::Error::RowNotFound.into();
        match error {
            HubError::Persistence { .. } => {}
            _ => panic!("Expected Persistence variant"),
        }
    }
}
