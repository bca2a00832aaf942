use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use common::bucket::BucketLocation;
use common::metadata::{DeletedSegmentInfo, ObjectMetadata, OnDeletedSegments, PieceLocation};

use crate::database::{types::DUuid, Database};

pub const DEFAULT_DELETE_BATCH_SIZE: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum ObjectQueryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid piece list for segment {0}: {1}")]
    Pieces(String, serde_json::Error),
}

fn push_in_list<'a>(query: &mut QueryBuilder<'a, Sqlite>, values: &'a [String]) {
    query.push(" IN (");
    let mut list = query.separated(", ");
    for value in values {
        list.push_bind(value.as_str());
    }
    list.push_unseparated(")");
}

impl Database {
    /// Record an object with one segment per entry of `segments`.
    ///
    /// Objects are written by the upload path, which lives outside this
    /// service; this exists to seed buckets.
    pub async fn put_object(
        &self,
        bucket: &BucketLocation,
        key: &str,
        segments: &[Vec<PieceLocation>],
    ) -> Result<(), ObjectQueryError> {
        let stream_id = Uuid::new_v4().to_string();
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO objects (project_id, bucket_name, object_key, stream_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(DUuid::from(bucket.project_id))
        .bind(&bucket.bucket_name)
        .bind(key)
        .bind(&stream_id)
        .execute(&mut *tx)
        .await?;

        for (position, pieces) in segments.iter().enumerate() {
            let root_piece_id = Uuid::new_v4().to_string();
            let pieces = serde_json::to_string(pieces)
                .map_err(|e| ObjectQueryError::Pieces(root_piece_id.clone(), e))?;
            sqlx::query(
                r#"
                INSERT INTO segments (stream_id, position, root_piece_id, pieces)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&stream_id)
            .bind(position as i64)
            .bind(&root_piece_id)
            .bind(pieces)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn object_count(&self, bucket: &BucketLocation) -> Result<u64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM objects WHERE project_id = ?1 AND bucket_name = ?2",
        )
        .bind(DUuid::from(bucket.project_id))
        .bind(&bucket.bucket_name)
        .fetch_one(&**self)
        .await?;
        Ok(count as u64)
    }

    /// Delete up to one batch of objects in a single transaction, returning
    /// how many went and the segments they held.
    async fn delete_object_batch(
        &self,
        bucket: &BucketLocation,
    ) -> Result<(u64, Vec<DeletedSegmentInfo>), ObjectQueryError> {
        let mut tx = self.begin().await?;

        let stream_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT stream_id FROM objects
            WHERE project_id = ?1 AND bucket_name = ?2
            ORDER BY object_key
            LIMIT ?3
            "#,
        )
        .bind(DUuid::from(bucket.project_id))
        .bind(&bucket.bucket_name)
        .bind(self.delete_batch_size as i64)
        .fetch_all(&mut *tx)
        .await?;

        if stream_ids.is_empty() {
            tx.commit().await?;
            return Ok((0, Vec::new()));
        }

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT root_piece_id, pieces FROM segments WHERE stream_id",
        );
        push_in_list(&mut select, &stream_ids);
        let rows = select.build().fetch_all(&mut *tx).await?;

        let mut segments = Vec::with_capacity(rows.len());
        for row in rows {
            let root_piece_id: String = row.try_get("root_piece_id")?;
            let pieces: String = row.try_get("pieces")?;
            let pieces = serde_json::from_str(&pieces)
                .map_err(|e| ObjectQueryError::Pieces(root_piece_id.clone(), e))?;
            segments.push(DeletedSegmentInfo {
                root_piece_id,
                pieces,
            });
        }

        let mut delete_segments = QueryBuilder::<Sqlite>::new("DELETE FROM segments WHERE stream_id");
        push_in_list(&mut delete_segments, &stream_ids);
        delete_segments.build().execute(&mut *tx).await?;

        let mut delete_objects = QueryBuilder::<Sqlite>::new("DELETE FROM objects WHERE stream_id");
        push_in_list(&mut delete_objects, &stream_ids);
        let deleted = delete_objects.build().execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;
        Ok((deleted, segments))
    }
}

#[async_trait]
impl ObjectMetadata for Database {
    type Error = ObjectQueryError;

    async fn bucket_empty(&self, bucket: &BucketLocation) -> Result<bool, Self::Error> {
        let row = sqlx::query(
            "SELECT 1 FROM objects WHERE project_id = ?1 AND bucket_name = ?2 LIMIT 1",
        )
        .bind(DUuid::from(bucket.project_id))
        .bind(&bucket.bucket_name)
        .fetch_optional(&**self)
        .await?;
        Ok(row.is_none())
    }

    async fn delete_bucket_objects(
        &self,
        bucket: &BucketLocation,
        on_deleted: OnDeletedSegments<'_>,
    ) -> Result<u64, Self::Error> {
        let mut deleted = 0;
        loop {
            let (count, segments) = self.delete_object_batch(bucket).await?;
            if count == 0 {
                break;
            }
            deleted += count;
            tracing::debug!(%bucket, count, segments = segments.len(), "deleted object batch");
            if !segments.is_empty() {
                on_deleted(segments);
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn pieces() -> Vec<PieceLocation> {
        vec![
            PieceLocation {
                node_id: "node-a".to_string(),
                piece_num: 0,
            },
            PieceLocation {
                node_id: "node-b".to_string(),
                piece_num: 1,
            },
        ]
    }

    #[tokio::test]
    async fn test_bucket_empty() {
        let db = Database::in_memory().await.unwrap();
        let bucket = BucketLocation::new(Uuid::new_v4(), "photos");
        assert!(db.bucket_empty(&bucket).await.unwrap());

        db.put_object(&bucket, "a.jpg", &[pieces()]).await.unwrap();
        assert!(!db.bucket_empty(&bucket).await.unwrap());

        // same name, other project
        let other = BucketLocation::new(Uuid::new_v4(), "photos");
        assert!(db.bucket_empty(&other).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_reports_each_batch() {
        let db = Database::in_memory()
            .await
            .unwrap()
            .with_delete_batch_size(2);
        let bucket = BucketLocation::new(Uuid::new_v4(), "photos");
        let neighbour = BucketLocation::new(bucket.project_id, "music");

        for i in 0..5 {
            db.put_object(&bucket, &format!("object-{}", i), &[pieces(), pieces()])
                .await
                .unwrap();
        }
        db.put_object(&bucket, "empty", &[]).await.unwrap();
        db.put_object(&neighbour, "song", &[pieces()]).await.unwrap();

        let batches = Mutex::new(Vec::new());
        let deleted = db
            .delete_bucket_objects(&bucket, &|batch: Vec<DeletedSegmentInfo>| {
                batches.lock().unwrap().push(batch.len())
            })
            .await
            .unwrap();

        assert_eq!(deleted, 6);
        // keys sort as "empty", "object-0", ...: batches of 2 objects each
        assert_eq!(batches.into_inner().unwrap(), vec![2, 4, 4]);
        assert!(db.bucket_empty(&bucket).await.unwrap());
        assert_eq!(db.object_count(&neighbour).await.unwrap(), 1);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM segments")
            .fetch_one(&*db)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }
}
