use common::metadata::DeletedSegmentInfo;

use crate::database::Database;

impl Database {
    /// Record every piece of `segments` for the storage node deletion
    /// workers. Returns the number of rows queued.
    pub async fn queue_piece_deletions(
        &self,
        segments: &[DeletedSegmentInfo],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = self.begin().await?;
        let mut queued = 0;
        for segment in segments {
            for piece in &segment.pieces {
                sqlx::query(
                    r#"
                    INSERT INTO piece_deletions (node_id, root_piece_id, piece_num)
                    VALUES (?1, ?2, ?3)
                    "#,
                )
                .bind(&piece.node_id)
                .bind(&segment.root_piece_id)
                .bind(i64::from(piece.piece_num))
                .execute(&mut *tx)
                .await?;
                queued += 1;
            }
        }
        tx.commit().await?;
        Ok(queued)
    }

    pub async fn pending_piece_deletions(&self) -> Result<u64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM piece_deletions")
            .fetch_one(&**self)
            .await?;
        Ok(count as u64)
    }
}
