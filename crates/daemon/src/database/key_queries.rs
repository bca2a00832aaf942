use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use common::capability::{Capability, SECRET_LEN};
use common::keys::{KeyInfo, KeyResolver};

use crate::database::{is_unique_violation, types::DUuid, Database};

#[derive(Debug, thiserror::Error)]
pub enum KeyQueryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored secret for key {0} has the wrong length")]
    CorruptSecret(Uuid),
    #[error("key head collision")]
    HeadCollision,
}

impl Database {
    /// Mint a key for `project_id` and return its root capability. The
    /// project must exist.
    pub async fn issue_key(&self, project_id: Uuid) -> Result<(KeyInfo, Capability), KeyQueryError> {
        let (info, root) = KeyInfo::generate(project_id);
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, project_id, head, secret, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(DUuid::from(info.id))
        .bind(DUuid::from(info.project_id))
        .bind(info.head.as_slice())
        .bind(info.secret.as_slice())
        .bind(info.created_at)
        .execute(&**self)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                KeyQueryError::HeadCollision
            } else {
                KeyQueryError::Database(e)
            }
        })?;

        tracing::info!(key_id = %info.id, %project_id, "issued API key");
        Ok((info, root))
    }
}

#[async_trait]
impl KeyResolver for Database {
    type Error = KeyQueryError;

    async fn get_key_by_head(&self, head: &[u8]) -> Result<Option<KeyInfo>, Self::Error> {
        let row = sqlx::query(
            "SELECT id, project_id, head, secret, created_at FROM api_keys WHERE head = ?1",
        )
        .bind(head)
        .fetch_optional(&**self)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: DUuid = row.try_get("id")?;
        let project_id: DUuid = row.try_get("project_id")?;
        let secret: Vec<u8> = row.try_get("secret")?;
        let secret: [u8; SECRET_LEN] = secret
            .try_into()
            .map_err(|_| KeyQueryError::CorruptSecret(id.into()))?;

        Ok(Some(KeyInfo {
            id: id.into(),
            project_id: project_id.into(),
            head: row.try_get("head")?,
            secret,
            created_at: row.try_get("created_at")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let db = Database::in_memory().await.unwrap();
        let project = db.create_project(None).await.unwrap();

        let (info, root) = db.issue_key(project.id).await.unwrap();
        let resolved = db.get_key_by_head(root.head()).await.unwrap().unwrap();
        assert_eq!(resolved.id, info.id);
        assert_eq!(resolved.project_id, project.id);
        assert!(root.validate(&resolved.secret));

        assert!(db.get_key_by_head(b"nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_issue_requires_project() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.issue_key(Uuid::new_v4()).await.is_err());
    }
}
