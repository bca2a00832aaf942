use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use time::OffsetDateTime;
use uuid::Uuid;

use common::bucket::{Bucket, BucketList, ListDirection, ListOptions};
use common::capability::AllowedBuckets;
use common::catalog::{BucketCatalog, CatalogError};

use crate::database::{is_unique_violation, types::DUuid, Database};

fn bucket_from_row(row: &SqliteRow) -> Result<Bucket, sqlx::Error> {
    let id: DUuid = row.try_get("id")?;
    let project_id: DUuid = row.try_get("project_id")?;
    let partner_id: Option<DUuid> = row.try_get("partner_id")?;
    let user_agent: Option<String> = row.try_get("user_agent")?;
    let created_at: OffsetDateTime = row.try_get("created_at")?;
    Ok(Bucket {
        id: id.into(),
        name: row.try_get("name")?,
        project_id: project_id.into(),
        partner_id: partner_id.map(Into::into),
        user_agent,
        created_at,
    })
}

#[async_trait]
impl BucketCatalog for Database {
    type Error = sqlx::Error;

    async fn get_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<Bucket, CatalogError<Self::Error>> {
        let row = sqlx::query(
            r#"
            SELECT id, project_id, name, partner_id, user_agent, created_at
            FROM buckets
            WHERE project_id = ?1 AND name = ?2
            "#,
        )
        .bind(DUuid::from(project_id))
        .bind(name)
        .fetch_optional(&**self)
        .await?;

        match row {
            Some(row) => Ok(bucket_from_row(&row)?),
            None => Err(CatalogError::NotFound(name.to_string())),
        }
    }

    async fn has_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<bool, CatalogError<Self::Error>> {
        let row = sqlx::query("SELECT 1 FROM buckets WHERE project_id = ?1 AND name = ?2")
            .bind(DUuid::from(project_id))
            .bind(name)
            .fetch_optional(&**self)
            .await?;
        Ok(row.is_some())
    }

    async fn count_buckets(&self, project_id: Uuid) -> Result<u64, CatalogError<Self::Error>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buckets WHERE project_id = ?1")
            .bind(DUuid::from(project_id))
            .fetch_one(&**self)
            .await?;
        Ok(count as u64)
    }

    async fn create_bucket(&self, bucket: Bucket) -> Result<Bucket, CatalogError<Self::Error>> {
        sqlx::query(
            r#"
            INSERT INTO buckets (id, project_id, name, partner_id, user_agent, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(DUuid::from(bucket.id))
        .bind(DUuid::from(bucket.project_id))
        .bind(&bucket.name)
        .bind(bucket.partner_id.map(DUuid::from))
        .bind(bucket.user_agent.as_deref())
        .bind(bucket.created_at)
        .execute(&**self)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::AlreadyExists(bucket.name.clone())
            } else {
                CatalogError::Provider(e)
            }
        })?;

        Ok(bucket)
    }

    async fn list_buckets(
        &self,
        project_id: Uuid,
        opts: &ListOptions,
        allowed: &AllowedBuckets,
    ) -> Result<BucketList, CatalogError<Self::Error>> {
        if !allowed.all && allowed.buckets.is_empty() {
            return Ok(BucketList::default());
        }
        let limit = opts.effective_limit();

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, project_id, name, partner_id, user_agent, created_at FROM buckets WHERE project_id = ",
        );
        query.push_bind(DUuid::from(project_id));

        if !opts.cursor.is_empty() {
            query.push(match opts.direction {
                ListDirection::Forward => " AND name > ",
                ListDirection::Backward => " AND name < ",
            });
            query.push_bind(opts.cursor.clone());
        }

        if !allowed.all {
            query.push(" AND name IN (");
            let mut names = query.separated(", ");
            for name in &allowed.buckets {
                names.push_bind(name.clone());
            }
            names.push_unseparated(")");
        }

        query.push(match opts.direction {
            ListDirection::Forward => " ORDER BY name ASC LIMIT ",
            ListDirection::Backward => " ORDER BY name DESC LIMIT ",
        });
        // one extra row tells us whether another page exists
        query.push_bind((limit + 1) as i64);

        let rows = query.build().fetch_all(&**self).await?;
        let more = rows.len() > limit;
        let items = rows
            .iter()
            .take(limit)
            .map(bucket_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BucketList { items, more })
    }

    async fn delete_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<(), CatalogError<Self::Error>> {
        let result = sqlx::query("DELETE FROM buckets WHERE project_id = ?1 AND name = ?2")
            .bind(DUuid::from(project_id))
            .bind(name)
            .execute(&**self)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(name.to_string()));
        }
        Ok(())
    }
}
