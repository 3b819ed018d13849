//! Stateless session tokens.
//!
//! A token asserts `(user id, wallet address)` and is checked only by its
//! signature, issuer and expiry. There is no server-side session table and no
//! revocation list: logging out does not invalidate a token already issued.

mod header;
mod token;

pub use header::extract_from_header;
pub use token::{SessionClaims, TokenIssuer};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingHeader,
    #[error("Authorization header format must be: Bearer <token>")]
    MalformedHeader,
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AuthError::MissingHeader.to_string(),
            "Authorization header is required"
        );
        assert_eq!(
            AuthError::MalformedHeader.to_string(),
            "Authorization header format must be: Bearer <token>"
        );
        assert!(AuthError::InvalidToken("ExpiredSignature".to_string())
            .to_string()
            .contains("Invalid or expired token"));
    }
}
