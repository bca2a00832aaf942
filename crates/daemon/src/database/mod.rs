mod bucket_queries;
mod key_queries;
mod object_queries;
mod piece_queries;
mod project_queries;
mod sqlite;
mod types;

use std::ops::Deref;

use sqlx::SqlitePool;

pub use key_queries::KeyQueryError;
pub use object_queries::DEFAULT_DELETE_BATCH_SIZE;
pub use project_queries::Project;

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
    /// Objects removed per transaction when draining a bucket
    delete_batch_size: usize,
}

impl Database {
    pub async fn connect(database_url: &url::Url) -> Result<Self, DatabaseSetupError> {
        if database_url.scheme() == "sqlite" {
            let db = sqlite::connect_sqlite(database_url).await?;
            sqlite::migrate_sqlite(&db).await?;
            return Ok(Database::new(db));
        }

        Err(DatabaseSetupError::UnknownDbType(
            database_url.scheme().to_string(),
        ))
    }

    /// A fresh, migrated, in-memory database
    pub async fn in_memory() -> Result<Self, DatabaseSetupError> {
        let db = sqlite::connect_sqlite_memory().await?;
        sqlite::migrate_sqlite(&db).await?;
        Ok(Database::new(db))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            delete_batch_size: DEFAULT_DELETE_BATCH_SIZE,
        }
    }

    pub fn with_delete_batch_size(mut self, batch_size: usize) -> Self {
        self.delete_batch_size = batch_size.max(1);
        self
    }
}

impl Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseSetupError {
    #[error("error occurred while attempting database migration: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    #[error("unable to perform initial connection and check of the database: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("requested database type was not recognized: {0}")]
    UnknownDbType(String),
}

/// Whether a query failed on a UNIQUE or PRIMARY KEY constraint
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}
