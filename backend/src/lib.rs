pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod session;
pub mod store;
pub mod test_util;

pub use auth::{AuthError, SessionClaims, TokenIssuer};
pub use crate::config::{Config, ConfigError};
pub use error::SessionError;
pub use models::User;
pub use session::{LoginOutcome, LogoutOutcome, SessionService};
pub use store::{IdentityStore, MemoryIdentityStore, SqliteIdentityStore, StoreError};

use std::sync::Arc;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Login/logout orchestration over the identity store.
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn IdentityStore>) -> Self {
        let tokens = TokenIssuer::from_config(&config.auth);
        Self {
            config,
            sessions: SessionService::new(store, tokens),
        }
    }
}

/// Build the full HTTP application.
///
/// User routes are served both under `/user` and at the root.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .nest("/user", routes::user::router())
        .merge(routes::user::router())
        .merge(routes::health::router())
        .with_state(state)
        .layer(middleware::from_fn(logging::request_logger))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("cross-origin"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
            ACCEPT,
        ]);

    match config.origins() {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(values))
        }
    }
}
