use chrono::{DateTime, Utc};
use serde::Serialize;

/// Role assigned to every newly registered wallet.
pub const DEFAULT_PERMISSION: &str = "user";

/// User record, one per wallet address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// Generated at creation, never changes
    pub id: String,
    /// Wallet address as supplied by the client (exact, case-sensitive)
    pub wallet_address: String,
    /// When the wallet first logged in
    pub created_at: DateTime<Utc>,
    /// Role tag, `"user"` unless changed out of band
    pub permission: String,
    /// Whether the wallet currently has an active session
    pub joined: bool,
}

impl User {
    /// A freshly registered user with an active session.
    pub fn register(wallet_address: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            wallet_address: wallet_address.to_string(),
            created_at: Utc::now(),
            permission: DEFAULT_PERMISSION.to_string(),
            joined: true,
        }
    }
}
