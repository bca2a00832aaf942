//! Fire-and-forget hand-off of deleted segment pieces
//!
//! Draining a bucket removes object metadata synchronously but leaves the
//! physical pieces on storage nodes. Each batch of pieces is pushed onto a
//! flume channel and reclaimed by a background worker; the drain never waits
//! on, or fails because of, that worker.

use crate::metadata::DeletedSegmentInfo;

/// Configuration for the piece deletion queue
#[derive(Debug, Clone)]
pub struct PieceQueueConfig {
    /// Maximum number of queued batches. None means unbounded.
    pub max_queue_size: Option<usize>,
}

impl Default for PieceQueueConfig {
    fn default() -> Self {
        Self {
            max_queue_size: Some(10_000),
        }
    }
}

/// Sending half of the piece deletion queue
#[derive(Debug, Clone)]
pub struct PieceDeletionQueue {
    tx: flume::Sender<Vec<DeletedSegmentInfo>>,
}

impl PieceDeletionQueue {
    /// Create a new queue
    ///
    /// Returns a tuple of (queue, receiver). The receiver should be passed to
    /// the worker task.
    pub fn new(config: PieceQueueConfig) -> (Self, PieceDeletionReceiver) {
        let (tx, rx) = match config.max_queue_size {
            Some(size) => {
                tracing::info!("Creating bounded piece deletion queue with size {}", size);
                flume::bounded(size)
            }
            None => {
                tracing::info!("Creating unbounded piece deletion queue");
                flume::unbounded()
            }
        };

        (Self { tx }, PieceDeletionReceiver { rx })
    }

    /// Queue a batch for deletion without waiting. A full or closed queue
    /// drops the batch; the pieces are left for garbage collection.
    pub fn notify(&self, batch: Vec<DeletedSegmentInfo>) {
        if batch.is_empty() {
            return;
        }
        let segments = batch.len();
        match self.tx.try_send(batch) {
            Ok(()) => tracing::debug!(segments, "queued segment pieces for deletion"),
            Err(flume::TrySendError::Full(_)) => {
                tracing::warn!(segments, "piece deletion queue is full, dropping batch")
            }
            Err(flume::TrySendError::Disconnected(_)) => {
                tracing::warn!(segments, "piece deletion worker has stopped, dropping batch")
            }
        }
    }
}

/// Receiving half of the piece deletion queue
#[derive(Debug)]
pub struct PieceDeletionReceiver {
    rx: flume::Receiver<Vec<DeletedSegmentInfo>>,
}

impl PieceDeletionReceiver {
    /// Convert to an async stream for use in tokio::select!
    pub fn into_async(self) -> flume::r#async::RecvStream<'static, Vec<DeletedSegmentInfo>> {
        self.rx.into_stream()
    }

    /// Take every batch queued so far without waiting.
    pub fn drain(&self) -> Vec<Vec<DeletedSegmentInfo>> {
        self.rx.try_iter().collect()
    }
}
