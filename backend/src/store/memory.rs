use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{validate_wallet_address, IdentityStore, StoreError, UpdateResult};
use crate::models::User;

/// Identity store kept in process memory.
///
/// Nothing survives a restart; used by tests and `database.url = "memory://"`.
pub struct MemoryIdentityStore {
    users: RwLock<HashMap<String, User>>,
    closed: AtomicBool,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError> {
        self.ensure_open()?;
        Ok(self.users.read().await.get(wallet_address).cloned())
    }

    async fn create_user(&self, wallet_address: &str) -> Result<User, StoreError> {
        self.ensure_open()?;
        validate_wallet_address(wallet_address)?;

        let mut users = self.users.write().await;
        if users.contains_key(wallet_address) {
            return Err(StoreError::Conflict(wallet_address.to_string()));
        }

        let user = User::register(wallet_address);
        users.insert(wallet_address.to_string(), user.clone());
        Ok(user)
    }

    async fn set_joined(
        &self,
        wallet_address: &str,
        joined: bool,
    ) -> Result<UpdateResult, StoreError> {
        self.ensure_open()?;
        let mut users = self.users.write().await;
        let user = users
            .get_mut(wallet_address)
            .ok_or_else(|| StoreError::NotFound(wallet_address.to_string()))?;

        let modified = if user.joined == joined {
            0
        } else {
            user.joined = joined;
            1
        };
        Ok(UpdateResult { matched: 1, modified })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
