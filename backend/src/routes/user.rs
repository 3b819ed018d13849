//! `POST /login` and `POST /logout`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use wallet_session_common::{ApiResponse, LoginData, LoginRequest, LogoutData};

use crate::auth::AuthError;
use crate::error::{Result, SessionError};
use crate::AppState;

/// Build the user router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// POST /login - find-or-create the wallet's user and issue a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<LoginData>>)> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!("Rejected login body: {}", e.body_text());
        SessionError::Validation("Request body must be a JSON object".to_string())
    })?;

    let outcome = state.sessions.login(request.wallet_address.as_ref()).await?;

    let status = outcome.status();
    let message = outcome.message();
    Ok((status, Json(ApiResponse::ok(message, LoginData::from(outcome)))))
}

/// POST /logout - clear the session flag of the token's wallet.
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<LogoutData>>> {
    let header = match headers.get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };

    let claims = state.sessions.authenticate(header)?;
    let outcome = state.sessions.logout(&claims).await?;

    Ok(Json(ApiResponse::ok(
        "User logged out successfully",
        LogoutData::from(outcome),
    )))
}
