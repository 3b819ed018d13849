//! Request-level error taxonomy.
//!
//! Every failure of a login or logout ends here and is rendered as the
//! `{ success: false, message, error }` envelope. Nothing escapes the request
//! boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use wallet_session_common::ApiResponse;

use crate::auth::AuthError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Bad or missing client input.
    #[error("{0}")]
    Validation(String),

    /// Missing/malformed Authorization header, or a token that failed verification.
    #[error("Authentication failed: {0}")]
    Unauthorized(AuthError),

    /// Authenticated identity with no backing record.
    #[error("User not found: {0}")]
    NotFound(String),

    /// Store unavailable, write not acknowledged, or a uniqueness conflict.
    #[error("Persistence failure: {source}")]
    Persistence {
        source: StoreError,
        retryable: bool,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    pub fn status(&self) -> StatusCode {
        match self {
            SessionError::Validation(_) => StatusCode::BAD_REQUEST,
            SessionError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Persistence { .. } | SessionError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Persistence { retryable: true, .. })
    }

    /// Client-facing `(message, error)` pair. Never carries store internals
    /// or says whether a wallet exists.
    fn client_message(&self) -> (String, &'static str) {
        match self {
            SessionError::Validation(msg) => (msg.clone(), "Invalid input"),
            SessionError::Unauthorized(AuthError::MissingHeader) => (
                "Authentication failed".to_string(),
                "Authorization header is required",
            ),
            SessionError::Unauthorized(AuthError::MalformedHeader) => (
                "Authentication failed".to_string(),
                "Authorization header format must be: Bearer <token>",
            ),
            SessionError::Unauthorized(_) => (
                "Authentication failed".to_string(),
                "Invalid or expired token",
            ),
            SessionError::NotFound(_) => ("User not found".to_string(), "Invalid user credentials"),
            SessionError::Persistence {
                source: StoreError::NotAcknowledged(_),
                ..
            } => (
                "Failed to create user account".to_string(),
                "Database insertion failed",
            ),
            SessionError::Persistence {
                retryable: true, ..
            } => (
                "Internal server error".to_string(),
                "Conflicting concurrent request, please retry",
            ),
            SessionError::Persistence { .. } | SessionError::Internal(_) => (
                "Internal server error".to_string(),
                "An unexpected error occurred",
            ),
        }
    }
}

impl From<AuthError> for SessionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(msg) => SessionError::Internal(msg),
            other => SessionError::Unauthorized(other),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => SessionError::Validation(msg),
            StoreError::NotFound(wallet) => SessionError::NotFound(wallet),
            conflict @ StoreError::Conflict(_) => SessionError::Persistence {
                source: conflict,
                retryable: true,
            },
            other => SessionError::Persistence {
                source: other,
                retryable: false,
            },
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, retryable = self.is_retryable(), "Request failed");
        }

        let (message, error) = self.client_message();
        let body: ApiResponse = ApiResponse::failure(message, error);
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
