use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::{validate_wallet_address, IdentityStore, StoreError, UpdateResult};
use crate::models::User;

/// SQLite-backed identity store.
pub struct SqliteIdentityStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteIdentityStore {
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        // Parse sqlite: prefix if present
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        if path != ":memory:" {
            // Create parent directories if needed
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                wallet_address TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                permission TEXT NOT NULL DEFAULT 'user',
                joined INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::info!("Identity store initialized with database: {}", path);

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let guard = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        f(conn)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Database(format!("bad created_at {:?}: {}", raw, e)))
}

#[async_trait]
impl IdentityStore for SqliteIdentityStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError> {
        self.with_conn(|conn| {
            let row: Option<(String, String, String, String, bool)> = conn
                .query_row(
                    "SELECT id, wallet_address, created_at, permission, joined
                     FROM users WHERE wallet_address = ?1",
                    params![wallet_address],
                    |row| {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get::<_, i32>(4)? != 0,
                        ))
                    },
                )
                .optional()
                .map_err(|e| StoreError::Database(e.to_string()))?;

            row.map(|(id, wallet_address, created_at, permission, joined)| {
                Ok(User {
                    id,
                    wallet_address,
                    created_at: parse_timestamp(&created_at)?,
                    permission,
                    joined,
                })
            })
            .transpose()
        })
    }

    async fn create_user(&self, wallet_address: &str) -> Result<User, StoreError> {
        validate_wallet_address(wallet_address)?;
        let user = User::register(wallet_address);

        self.with_conn(|conn| {
            let inserted = conn
                .execute(
                    "INSERT INTO users (id, wallet_address, created_at, permission, joined)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        user.id,
                        user.wallet_address,
                        user.created_at.to_rfc3339(),
                        user.permission,
                        user.joined as i32,
                    ],
                )
                .map_err(|e| match e {
                    rusqlite::Error::SqliteFailure(ref err, _)
                        if err.code == ErrorCode::ConstraintViolation =>
                    {
                        StoreError::Conflict(wallet_address.to_string())
                    }
                    other => StoreError::Database(other.to_string()),
                })?;

            if inserted != 1 {
                return Err(StoreError::NotAcknowledged(format!(
                    "insert for {} affected {} rows",
                    wallet_address, inserted
                )));
            }
            Ok(())
        })?;

        tracing::debug!("Inserted user {} for wallet {}", user.id, wallet_address);
        Ok(user)
    }

    async fn set_joined(
        &self,
        wallet_address: &str,
        joined: bool,
    ) -> Result<UpdateResult, StoreError> {
        self.with_conn(|conn| {
            let current: Option<bool> = conn
                .query_row(
                    "SELECT joined FROM users WHERE wallet_address = ?1",
                    params![wallet_address],
                    |row| Ok(row.get::<_, i32>(0)? != 0),
                )
                .optional()
                .map_err(|e| StoreError::Database(e.to_string()))?;

            match current {
                None => Err(StoreError::NotFound(wallet_address.to_string())),
                Some(value) if value == joined => Ok(UpdateResult {
                    matched: 1,
                    modified: 0,
                }),
                Some(_) => {
                    let modified = conn
                        .execute(
                            "UPDATE users SET joined = ?1 WHERE wallet_address = ?2",
                            params![joined as i32, wallet_address],
                        )
                        .map_err(|e| StoreError::Database(e.to_string()))?;
                    Ok(UpdateResult {
                        matched: 1,
                        modified: modified as u64,
                    })
                }
            }
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
                .map(|_| ())
                .map_err(|e| StoreError::Database(e.to_string()))
        })
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if let Some(conn) = guard.take() {
            conn.close()
                .map_err(|(_, e)| StoreError::Database(e.to_string()))?;
            tracing::info!("Identity store closed");
        }
        Ok(())
    }
}
