use futures::StreamExt;
use tokio::sync::watch;

use common::metadata::DeletedSegmentInfo;

use crate::database::Database;

/// Move queued piece batches into the `piece_deletions` table.
///
/// Runs until the queue closes or shutdown is signalled. A batch that fails
/// to persist is logged and dropped; its pieces are left for garbage
/// collection on the storage nodes.
///
/// ```ignore
/// let (queue, receiver) = PieceDeletionQueue::new(PieceQueueConfig::default());
/// tokio::spawn(run_piece_worker(database, receiver.into_async(), shutdown_rx));
/// ```
pub async fn run_piece_worker(
    database: Database,
    mut batches: flume::r#async::RecvStream<'static, Vec<DeletedSegmentInfo>>,
    mut shutdown_rx: watch::Receiver<()>,
) {
    tracing::info!("Starting piece deletion worker");

    loop {
        tokio::select! {
            batch = batches.next() => {
                let Some(batch) = batch else {
                    tracing::info!("Piece deletion queue closed, stopping worker");
                    break;
                };
                match database.queue_piece_deletions(&batch).await {
                    Ok(queued) => tracing::debug!(segments = batch.len(), queued, "queued piece deletions"),
                    Err(e) => tracing::error!(segments = batch.len(), "failed to queue piece deletions: {}", e),
                }
            }

            _ = shutdown_rx.changed() => {
                tracing::info!("Shutdown signalled, stopping piece deletion worker");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use common::metadata::PieceLocation;
    use common::pieces::{PieceDeletionQueue, PieceQueueConfig};

    use super::*;

    #[tokio::test]
    async fn test_worker_persists_batches_until_queue_closes() {
        let db = Database::in_memory().await.unwrap();
        let (queue, receiver) = PieceDeletionQueue::new(PieceQueueConfig::default());
        let (_shutdown_tx, shutdown_rx) = watch::channel(());

        let worker = tokio::spawn(run_piece_worker(
            db.clone(),
            receiver.into_async(),
            shutdown_rx,
        ));

        queue.notify(vec![DeletedSegmentInfo {
            root_piece_id: "root".to_string(),
            pieces: vec![
                PieceLocation {
                    node_id: "node-a".to_string(),
                    piece_num: 0,
                },
                PieceLocation {
                    node_id: "node-b".to_string(),
                    piece_num: 3,
                },
            ],
        }]);
        drop(queue);

        tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(db.pending_piece_deletions().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_worker_stops_on_shutdown() {
        let db = Database::in_memory().await.unwrap();
        let (_queue, receiver) = PieceDeletionQueue::new(PieceQueueConfig::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let worker = tokio::spawn(run_piece_worker(db, receiver.into_async(), shutdown_rx));
        shutdown_tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .unwrap()
            .unwrap();
    }
}
