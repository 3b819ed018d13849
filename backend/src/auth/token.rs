use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::{AuthConfig, MAX_TOKEN_TTL_HOURS};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "walletAddress")]
    pub wallet_address: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
    pub iss: String,
}

/// Issues and verifies HS256 session tokens with a process-wide secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], issuer: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: issuer.to_string(),
            ttl,
        }
    }

    /// Build from config. The TTL is capped at `MAX_TOKEN_TTL_HOURS`.
    pub fn from_config(config: &AuthConfig) -> Self {
        let ttl_hours = config.token_ttl_hours.min(MAX_TOKEN_TTL_HOURS) as i64;
        Self::new(
            config.jwt_secret.as_bytes(),
            &config.issuer,
            Duration::hours(ttl_hours),
        )
    }

    /// Validity window of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `(user_id, wallet_address)` valid from now.
    pub fn issue(&self, user_id: &str, wallet_address: &str) -> Result<String, AuthError> {
        self.issue_at(user_id, wallet_address, Utc::now())
    }

    /// Mint a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: &str,
        wallet_address: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            AuthError::Signing(format!("expiry overflows for ttl {}", self.ttl))
        })?;

        let claims = SessionClaims {
            user_id: user_id.to_string(),
            wallet_address: wallet_address.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Check signature, issuer and expiry, and return the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(format!("{:?}", e.kind())))
    }
}
