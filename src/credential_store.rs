/// Credential Store
///
/// Persists username → bcrypt hash mappings in a single SQLite table.
/// Records are created only by the startup seed and are never updated
/// or deleted here.

use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::auth::hash_password;
use crate::configuration::{DatabaseSettings, SeedSettings};
use crate::error::{AppError, DatabaseError};

/// A stored credential
#[derive(Clone)]
pub struct CredentialRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[redacted]")
            .finish()
    }
}

/// Public projection of a credential record
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a connection pool on the configured database file
    ///
    /// # Errors
    /// Returns `DatabaseError::Unavailable` if the file cannot be opened
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(settings.connect_options())
            .await
            .map_err(|e| AppError::Database(DatabaseError::Unavailable(e.to_string())))?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ensure the schema exists and the seed account is present
    ///
    /// Safe to call any number of times; a seed insert rejected by the
    /// unique constraint (another process got there first) is not an error.
    pub async fn initialize(&self, seed: &SeedSettings) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        if seed.username.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "seed.username must not be empty".to_string(),
            )));
        }

        if self.lookup(&seed.username).await?.is_some() {
            tracing::info!(username = %seed.username, "Seed user already present");
            return Ok(());
        }

        let password_hash = hash_password(&seed.password, seed.hash_cost)?;
        self.seed_if_absent(&seed.username, &password_hash).await?;
        Ok(())
    }

    /// Insert the seed record unless the unique constraint rejects it
    ///
    /// Returns whether a row was written. A rejection means another starter
    /// inserted the same username between our lookup and this insert.
    async fn seed_if_absent(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        match self.insert(username, password_hash).await {
            Ok(id) => {
                tracing::info!(user_id = id, username = %username, "Seed user created");
                Ok(true)
            }
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_))) => {
                tracing::info!(username = %username, "Seed user created concurrently");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Find the record for `username` (exact, case-sensitive match)
    pub async fn lookup(&self, username: &str) -> Result<Option<CredentialRecord>, AppError> {
        let record = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(|(id, username, password_hash)| CredentialRecord {
            id,
            username,
            password_hash,
        }))
    }

    /// All users in insertion order, without their hashes
    pub async fn list_all(&self) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, (i64, String)>("SELECT id, username FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(users
            .into_iter()
            .map(|(id, username)| UserSummary { id, username })
            .collect())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<i64, AppError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }
}
