use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::config::{AuthConfig, Config, CorsConfig, DatabaseConfig, LoggingConfig, ServerConfig};
use crate::store::{IdentityStore, MemoryIdentityStore, MEMORY_URL};
use crate::AppState;

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5184,
        },
        cors: CorsConfig {
            allowed_origins: "*".to_string(),
        },
        database: DatabaseConfig {
            url: MEMORY_URL.to_string(),
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            issuer: "kaspa-dex".to_string(),
            token_ttl_hours: 24,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

/// State over a fresh in-memory store. The store is returned for inspection.
pub fn create_test_state() -> (Arc<AppState>, Arc<MemoryIdentityStore>) {
    let store = Arc::new(MemoryIdentityStore::new());
    let state = create_test_state_with_store(store.clone());
    (state, store)
}

pub fn create_test_state_with_store(store: Arc<dyn IdentityStore>) -> Arc<AppState> {
    Arc::new(AppState::new(test_config(), store))
}

/// A token for `(user_id, wallet_address)` that expired an hour ago.
pub fn generate_expired_token(state: &AppState, user_id: &str, wallet_address: &str) -> String {
    let issued_at = Utc::now() - state.sessions.tokens().ttl() - Duration::hours(1);
    state
        .sessions
        .tokens()
        .issue_at(user_id, wallet_address, issued_at)
        .expect("Failed to sign token")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
