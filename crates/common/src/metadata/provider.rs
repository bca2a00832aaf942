use std::fmt::{Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bucket::BucketLocation;

/// One erasure-coded piece held by a storage node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceLocation {
    pub node_id: String,
    pub piece_num: u16,
}

/// The pieces of a segment whose metadata has just been removed. The piece
/// ids on each node are derived from `root_piece_id` and the piece number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedSegmentInfo {
    pub root_piece_id: String,
    pub pieces: Vec<PieceLocation>,
}

/// Callback receiving each batch of deleted segments during a bucket drain.
pub type OnDeletedSegments<'a> = &'a (dyn Fn(Vec<DeletedSegmentInfo>) + Send + Sync);

/// The object metadata store, as far as bucket lifecycle needs it.
#[async_trait]
pub trait ObjectMetadata: Send + Sync + std::fmt::Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// Whether any object or segment lives under the bucket. An existence
    ///  check, not a count.
    async fn bucket_empty(&self, bucket: &BucketLocation) -> Result<bool, Self::Error>;

    /// Delete every object under the bucket
    ///
    /// Walks the bucket in batches. After each batch's metadata is gone its
    ///  segment pieces are handed to `on_deleted` before the next batch is
    ///  fetched, so an interrupted walk has still reported everything it removed.
    ///
    /// # Returns
    /// * `Ok(u64)` - The number of objects deleted
    async fn delete_bucket_objects(
        &self,
        bucket: &BucketLocation,
        on_deleted: OnDeletedSegments<'_>,
    ) -> Result<u64, Self::Error>;
}
