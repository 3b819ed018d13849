//! Identity store: durable mapping from wallet address to user record.
//!
//! The store is the only shared mutable resource of the service. Uniqueness of
//! wallet addresses is enforced by the backing itself (a UNIQUE column for
//! SQLite, a keyed map for the in-memory store); callers never lock around a
//! read-then-write sequence.

mod memory;
mod sqlite;

pub use memory::MemoryIdentityStore;
pub use sqlite::SqliteIdentityStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::User;

/// Database URL that selects the in-memory store.
pub const MEMORY_URL: &str = "memory://";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid wallet address: {0}")]
    Validation(String),
    #[error("No user for wallet address: {0}")]
    NotFound(String),
    #[error("User already exists for wallet address: {0}")]
    Conflict(String),
    #[error("Write not acknowledged: {0}")]
    NotAcknowledged(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Store is closed")]
    Closed,
}

/// Outcome of a `set_joined` call on a matching record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

/// Persistence contract for user records keyed by wallet address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Short name of the backing (e.g., "sqlite", "memory").
    fn backend(&self) -> &'static str;

    /// Exact-match lookup on the wallet address.
    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new record with `permission = "user"` and `joined = true`.
    ///
    /// Fails with `Conflict` if a record for the address already exists.
    async fn create_user(&self, wallet_address: &str) -> Result<User, StoreError>;

    /// Set the `joined` flag of the matching record.
    async fn set_joined(&self, wallet_address: &str, joined: bool)
        -> Result<UpdateResult, StoreError>;

    /// Check that the backing is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release the backing. Later calls fail with `Closed`.
    async fn close(&self) -> Result<(), StoreError>;
}

/// Open the store named by `database_url`.
pub fn open(database_url: &str) -> Result<Arc<dyn IdentityStore>, StoreError> {
    if database_url == MEMORY_URL {
        tracing::info!("Using in-memory identity store");
        return Ok(Arc::new(MemoryIdentityStore::new()));
    }
    Ok(Arc::new(SqliteIdentityStore::open(database_url)?))
}

pub(crate) fn validate_wallet_address(wallet_address: &str) -> Result<(), StoreError> {
    if wallet_address.trim().is_empty() {
        return Err(StoreError::Validation(
            "wallet address must not be empty".to_string(),
        ));
    }
    Ok(())
}
