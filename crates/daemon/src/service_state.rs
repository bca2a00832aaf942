use std::sync::Arc;

use url::Url;

use common::endpoint::{Endpoint, EndpointConfig};
use common::pieces::PieceDeletionQueue;

use crate::database::{Database, DatabaseSetupError};
use crate::service_config::Config;

/// The bucket endpoint wired to SQLite for every collaborator
pub type SqliteEndpoint = Endpoint<Database, Database, Database, Database>;

/// Main service state - shared by the API and admin servers
#[derive(Clone)]
pub struct State {
    database: Database,
    endpoint: Arc<SqliteEndpoint>,
}

impl State {
    pub async fn from_config(
        config: &Config,
        pieces: PieceDeletionQueue,
    ) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let database = match config.sqlite_path {
            Some(ref path) => {
                let sqlite_database_url = Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)?;
                tracing::info!("Database URL: {}", sqlite_database_url);
                Database::connect(&sqlite_database_url).await?
            }
            // otherwise just set up an in-memory database
            None => {
                tracing::warn!("no database path configured, using an in-memory database");
                Database::in_memory().await?
            }
        }
        .with_delete_batch_size(config.delete_batch_size);

        // 2. Wire the endpoint
        Ok(Self::from_database(
            database,
            pieces,
            config.endpoint.clone(),
        ))
    }

    pub fn from_database(
        database: Database,
        pieces: PieceDeletionQueue,
        endpoint_config: EndpointConfig,
    ) -> Self {
        let endpoint = Endpoint::new(
            database.clone(),
            database.clone(),
            database.clone(),
            database.clone(),
            pieces,
            endpoint_config,
        );

        Self {
            database,
            endpoint: Arc::new(endpoint),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn endpoint(&self) -> &SqliteEndpoint {
        &self.endpoint
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        &self.database
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database setup error")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
}

#[cfg(test)]
mod tests {
    use common::pieces::PieceQueueConfig;

    use super::*;

    #[tokio::test]
    async fn test_from_config_creates_sqlite_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("db.sqlite");
        let config = Config {
            sqlite_path: Some(path.clone()),
            ..Default::default()
        };
        let (pieces, _receiver) = PieceDeletionQueue::new(PieceQueueConfig::default());

        let state = State::from_config(&config, pieces).await.unwrap();
        assert!(path.exists());

        let project = state.database().create_project(None).await.unwrap();
        assert_eq!(state.endpoint().count_buckets(project.id).await.unwrap(), 0);
    }
}
