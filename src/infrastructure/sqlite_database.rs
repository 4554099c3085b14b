use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use sqlx::{Executor, Row, Transaction};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::strong_types::{AccountId, UserId};
use crate::error::{AppError, AppResult};

/// Handle to the shared store file. One per command invocation.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Opens an existing store. A missing file is reported as
    /// `StoreUnavailable` rather than silently creating an empty database.
    pub async fn open(config: &Config) -> AppResult<Self> {
        let path = &config.database.path;
        if !path.exists() {
            return Err(AppError::StoreUnavailable(format!(
                "No database found at {}. Please create the database first.",
                path.display()
            )));
        }
        Self::connect(config, false).await
    }

    /// Creates the store file if needed and runs the schema script against it.
    /// The script is read before anything touches the disk, and a file this
    /// call created is removed again if the script fails, so a failed `create`
    /// never leaves behind a store that `open` would accept.
    pub async fn create(config: &Config) -> AppResult<Self> {
        let script = config.schema_script()?;
        let path = &config.database.path;
        let existed = path.exists();

        let db = Self::connect(config, true).await?;
        if let Err(err) = db.initialize(&script).await {
            db.close().await;
            if !existed {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove uninitialized store");
                }
            }
            return Err(err);
        }

        info!(path = %path.display(), "schema initialized");
        Ok(db)
    }

    async fn connect(config: &Config, create_if_missing: bool) -> AppResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.database.path)
            .create_if_missing(create_if_missing)
            .journal_mode(SqliteJournalMode::Delete)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::StoreUnavailable(format!(
                    "Failed to open SQLite database {}: {}",
                    config.database.path.display(),
                    e
                ))
            })?;

        debug!(path = %config.database.path.display(), "opened store");
        Ok(Self { pool })
    }

    /// Runs the schema script in one transaction. Every statement is
    /// `IF NOT EXISTS`, so this is safe to repeat against an initialized store.
    async fn initialize(&self, script: &str) -> AppResult<()> {
        let mut tx = self.begin_transaction().await?;
        (&mut *tx)
            .execute(script)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to initialize schema: {}", e)))?;
        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to initialize schema: {}", e)))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin_transaction(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Inserts a row into the shared `Users` table. Name and email are unique.
    pub async fn insert_user(&self, name: &str, email: &str) -> AppResult<UserId> {
        let result = sqlx::query("INSERT INTO Users (name, email) VALUES (?, ?)")
            .bind(name)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx(&format!("Failed to create user {}", name), e))?;

        let id = UserId::new(result.last_insert_rowid());
        info!(%id, name, "user created");
        Ok(id)
    }

    /// Maps a user name to its id; an unknown name is `NotFound`.
    pub async fn resolve_user(&self, name: &str) -> AppResult<UserId> {
        let row = sqlx::query("SELECT id FROM Users WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to look up user", e))?;

        match row {
            Some(row) => Ok(UserId::new(row.get("id"))),
            None => Err(AppError::NotFound(format!(
                "No user found with name: {}",
                name
            ))),
        }
    }

    pub async fn resolve_user_by_email(&self, email: &str) -> AppResult<UserId> {
        let row = sqlx::query("SELECT id FROM Users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to look up user by email", e))?;

        row.map(|row| UserId::new(row.get("id"))).ok_or_else(|| {
            AppError::NotFound(format!("No user found with email: {}", email))
        })
    }

    /// Maps a social user name to its account id; an unknown name is `NotFound`.
    pub async fn resolve_account(&self, user_name: &str) -> AppResult<AccountId> {
        let row = sqlx::query("SELECT id FROM Accounts WHERE userName = ?")
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_sqlx("Failed to look up account", e))?;

        row.map(|row| AccountId::new(row.get("id"))).ok_or_else(|| {
            AppError::NotFound(format!("No account found with username: {}", user_name))
        })
    }
}
