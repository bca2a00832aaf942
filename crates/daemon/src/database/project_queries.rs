use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use common::projects::ProjectSettings;

use crate::database::{types::DUuid, Database};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    /// None defers to the system-wide default
    pub max_buckets: Option<u64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Database {
    pub async fn create_project(&self, max_buckets: Option<u64>) -> Result<Project, sqlx::Error> {
        let project = Project {
            id: Uuid::new_v4(),
            max_buckets,
            created_at: OffsetDateTime::now_utc(),
        };
        sqlx::query("INSERT INTO projects (id, max_buckets, created_at) VALUES (?1, ?2, ?3)")
            .bind(DUuid::from(project.id))
            .bind(max_buckets.map(|m| m as i64))
            .bind(project.created_at)
            .execute(&**self)
            .await?;
        Ok(project)
    }

    pub async fn get_project(&self, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
        let row = sqlx::query("SELECT id, max_buckets, created_at FROM projects WHERE id = ?1")
            .bind(DUuid::from(id))
            .fetch_optional(&**self)
            .await?;

        row.map(|r| -> Result<Project, sqlx::Error> {
            let id: DUuid = r.try_get("id")?;
            let max_buckets: Option<i64> = r.try_get("max_buckets")?;
            Ok(Project {
                id: id.into(),
                max_buckets: max_buckets.map(|m| m as u64),
                created_at: r.try_get("created_at")?,
            })
        })
        .transpose()
    }

    /// Returns false if the project does not exist.
    pub async fn set_max_buckets(
        &self,
        id: Uuid,
        max_buckets: Option<u64>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE projects SET max_buckets = ?1 WHERE id = ?2")
            .bind(max_buckets.map(|m| m as i64))
            .bind(DUuid::from(id))
            .execute(&**self)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProjectSettings for Database {
    type Error = sqlx::Error;

    async fn max_buckets(&self, project_id: Uuid) -> Result<Option<u64>, Self::Error> {
        let limit: Option<Option<i64>> =
            sqlx::query_scalar("SELECT max_buckets FROM projects WHERE id = ?1")
                .bind(DUuid::from(project_id))
                .fetch_optional(&**self)
                .await?;
        Ok(limit.flatten().map(|m| m as u64))
    }
}
