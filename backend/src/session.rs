//! Login/logout orchestration over the identity store and the token issuer.
//!
//! Nothing here depends on the HTTP framework: handlers hand in the parsed
//! body field or the raw `Authorization` value and get typed outcomes back.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::Value;
use wallet_session_common::{LoginAction, LoginData, LogoutData};

use crate::auth::{extract_from_header, SessionClaims, TokenIssuer};
use crate::error::{Result, SessionError};
use crate::models::User;
use crate::store::{IdentityStore, StoreError};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
    pub action: LoginAction,
}

impl LoginOutcome {
    pub fn status(&self) -> StatusCode {
        match self.action {
            LoginAction::NewUserRegisteredAndLogin => StatusCode::CREATED,
            LoginAction::ExistingUserLogin => StatusCode::OK,
        }
    }

    pub fn message(&self) -> &'static str {
        match self.action {
            LoginAction::NewUserRegisteredAndLogin => "User registered and logged in successfully",
            LoginAction::ExistingUserLogin => "User logged in successfully",
        }
    }
}

impl From<LoginOutcome> for LoginData {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            id: outcome.user.id,
            public_key: outcome.user.wallet_address,
            created_date: outcome.user.created_at,
            permission: outcome.user.permission,
            joined: outcome.user.joined,
            action: outcome.action,
            token: outcome.token,
        }
    }
}

/// Result of a successful logout.
#[derive(Debug, Clone)]
pub struct LogoutOutcome {
    pub wallet_address: String,
    /// The record already had `joined = false`.
    pub already_logged_out: bool,
    pub logged_out_at: DateTime<Utc>,
}

impl From<LogoutOutcome> for LogoutData {
    fn from(outcome: LogoutOutcome) -> Self {
        Self {
            public_key: outcome.wallet_address,
            joined: false,
            logged_out_at: outcome.logged_out_at,
        }
    }
}

/// Validate the raw `wallet_address` field of a login body.
pub fn parse_wallet_address(raw: Option<&Value>) -> Result<&str> {
    match raw {
        Some(Value::String(address)) if !address.trim().is_empty() => Ok(address.as_str()),
        _ => Err(SessionError::Validation(
            "wallet_address is required and cannot be empty".to_string(),
        )),
    }
}

pub struct SessionService {
    store: Arc<dyn IdentityStore>,
    tokens: TokenIssuer,
}

impl SessionService {
    pub fn new(store: Arc<dyn IdentityStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Find-or-create the user for a wallet address and issue a token.
    ///
    /// Input is validated before the store is touched. The lookup and the
    /// write are not atomic; if a concurrent first login wins the insert, the
    /// record is read back once and this call continues as an existing-user
    /// login.
    pub async fn login(&self, raw_wallet: Option<&Value>) -> Result<LoginOutcome> {
        let wallet_address = parse_wallet_address(raw_wallet)?;

        if let Some(user) = self.store.find_by_wallet(wallet_address).await? {
            return self.login_existing(user).await;
        }

        match self.store.create_user(wallet_address).await {
            Ok(user) => {
                let token = self.tokens.issue(&user.id, &user.wallet_address)?;
                tracing::info!(
                    user_id = %user.id,
                    wallet = %user.wallet_address,
                    "New user registered"
                );
                Ok(LoginOutcome {
                    user,
                    token,
                    action: LoginAction::NewUserRegisteredAndLogin,
                })
            }
            Err(StoreError::Conflict(_)) => {
                tracing::warn!(
                    wallet = %wallet_address,
                    "Concurrent first login, re-reading record"
                );
                match self.store.find_by_wallet(wallet_address).await? {
                    Some(user) => self.login_existing(user).await,
                    None => Err(StoreError::Conflict(wallet_address.to_string()).into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn login_existing(&self, mut user: User) -> Result<LoginOutcome> {
        self.store.set_joined(&user.wallet_address, true).await?;
        user.joined = true;

        let token = self.tokens.issue(&user.id, &user.wallet_address)?;
        tracing::info!(user_id = %user.id, wallet = %user.wallet_address, "User logged in");
        Ok(LoginOutcome {
            user,
            token,
            action: LoginAction::ExistingUserLogin,
        })
    }

    /// Verify the bearer token carried by an `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<SessionClaims> {
        let claims = extract_from_header(header)
            .and_then(|token| self.tokens.verify(token))
            .map_err(|e| {
                tracing::warn!(reason = %e, "Authentication failed");
                SessionError::from(e)
            })?;

        tracing::debug!(wallet = %claims.wallet_address, "Authenticated");
        Ok(claims)
    }

    /// Clear the session flag of an authenticated wallet.
    ///
    /// Already-logged-out records still succeed. The token stays valid until
    /// it expires.
    pub async fn logout(&self, claims: &SessionClaims) -> Result<LogoutOutcome> {
        let result = self.store.set_joined(&claims.wallet_address, false).await?;

        let already_logged_out = result.modified == 0;
        if already_logged_out {
            tracing::warn!(wallet = %claims.wallet_address, "User was already logged out");
        } else {
            tracing::info!(wallet = %claims.wallet_address, "User logged out");
        }

        Ok(LogoutOutcome {
            wallet_address: claims.wallet_address.clone(),
            already_logged_out,
            logged_out_at: Utc::now(),
        })
    }

    /// Whether the store answers a ping.
    pub async fn health(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Identity store health check failed: {}", e);
                false
            }
        }
    }
}
