use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::provider::{DeletedSegmentInfo, ObjectMetadata, OnDeletedSegments, PieceLocation};
use crate::bucket::BucketLocation;

const DEFAULT_BATCH_SIZE: usize = 100;

type Objects = BTreeMap<String, Vec<DeletedSegmentInfo>>;

/// In-memory object metadata store
#[derive(Debug, Clone)]
pub struct MemoryObjectMetadata {
    /// bucket -> object key -> segments
    inner: Arc<RwLock<BTreeMap<BucketLocation, Objects>>>,
    batch_size: usize,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryObjectMetadataError {
    #[error("memory metadata error: {0}")]
    Internal(String),
}

impl MemoryObjectMetadata {
    pub fn new() -> Self {
        Self::with_batch_size(DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(BTreeMap::new())),
            batch_size: batch_size.max(1),
        }
    }

    /// Store an object with one segment per entry of `segments`.
    pub fn put_object(
        &self,
        bucket: &BucketLocation,
        key: impl Into<String>,
        segments: Vec<Vec<PieceLocation>>,
    ) -> Result<(), MemoryObjectMetadataError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let segments = segments
            .into_iter()
            .map(|pieces| DeletedSegmentInfo {
                root_piece_id: Uuid::new_v4().to_string(),
                pieces,
            })
            .collect();
        inner
            .entry(bucket.clone())
            .or_default()
            .insert(key.into(), segments);
        Ok(())
    }

    pub fn object_count(&self, bucket: &BucketLocation) -> Result<usize, MemoryObjectMetadataError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.get(bucket).map(|objects| objects.len()).unwrap_or(0))
    }

    /// Remove up to one batch of objects, returning how many went and their segments.
    fn take_batch(
        &self,
        bucket: &BucketLocation,
    ) -> Result<(u64, Vec<DeletedSegmentInfo>), MemoryObjectMetadataError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let Some(objects) = inner.get_mut(bucket) else {
            return Ok((0, Vec::new()));
        };

        let keys: Vec<String> = objects.keys().take(self.batch_size).cloned().collect();
        let mut segments = Vec::new();
        for key in &keys {
            if let Some(removed) = objects.remove(key) {
                segments.extend(removed);
            }
        }
        if objects.is_empty() {
            inner.remove(bucket);
        }

        Ok((keys.len() as u64, segments))
    }
}

impl Default for MemoryObjectMetadata {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> MemoryObjectMetadataError {
    MemoryObjectMetadataError::Internal(format!("failed to acquire lock: {}", e))
}

#[async_trait]
impl ObjectMetadata for MemoryObjectMetadata {
    type Error = MemoryObjectMetadataError;

    async fn bucket_empty(&self, bucket: &BucketLocation) -> Result<bool, Self::Error> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .get(bucket)
            .map(|objects| objects.is_empty())
            .unwrap_or(true))
    }

    async fn delete_bucket_objects(
        &self,
        bucket: &BucketLocation,
        on_deleted: OnDeletedSegments<'_>,
    ) -> Result<u64, Self::Error> {
        let mut deleted = 0;
        loop {
            let (count, segments) = self.take_batch(bucket)?;
            if count == 0 {
                break;
            }
            deleted += count;
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

    fn pieces(n: u16) -> Vec<PieceLocation> {
        (0..n)
            .map(|piece_num| PieceLocation {
                node_id: format!("node-{}", piece_num),
                piece_num,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_drain_reports_every_segment_in_batches() {
        let metadata = MemoryObjectMetadata::with_batch_size(2);
        let bucket = BucketLocation::new(Uuid::new_v4(), "photos");
        for i in 0..5 {
            metadata
                .put_object(&bucket, format!("obj-{}", i), vec![pieces(3), pieces(2)])
                .unwrap();
        }
        assert!(!metadata.bucket_empty(&bucket).await.unwrap());

        let batches = Mutex::new(Vec::new());
        let on_deleted = |segments: Vec<DeletedSegmentInfo>| {
            batches.lock().unwrap().push(segments.len());
        };
        let deleted = metadata
            .delete_bucket_objects(&bucket, &on_deleted)
            .await
            .unwrap();

        assert_eq!(deleted, 5);
        // 2 + 2 + 1 objects, two segments each
        assert_eq!(*batches.lock().unwrap(), vec![4, 4, 2]);
        assert!(metadata.bucket_empty(&bucket).await.unwrap());
    }

    #[tokio::test]
    async fn test_drain_leaves_other_buckets() {
        let metadata = MemoryObjectMetadata::new();
        let project = Uuid::new_v4();
        let photos = BucketLocation::new(project, "photos");
        let videos = BucketLocation::new(project, "videos");
        metadata.put_object(&photos, "a", vec![pieces(1)]).unwrap();
        metadata.put_object(&videos, "b", vec![pieces(1)]).unwrap();

        let deleted = metadata
            .delete_bucket_objects(&photos, &|_| {})
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(metadata.object_count(&videos).unwrap(), 1);
    }
}
