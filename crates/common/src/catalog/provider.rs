use std::fmt::{Debug, Display};

use async_trait::async_trait;
use uuid::Uuid;

use crate::bucket::{Bucket, BucketList, ListOptions};
use crate::capability::AllowedBuckets;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError<T> {
    /// Unhandled failure inside the backing store
    #[error("unhandled bucket catalog provider error: {0}")]
    Provider(#[from] T),
    /// No bucket with this name in the project
    #[error("bucket not found: {0}")]
    NotFound(String),
    /// A bucket with this name already exists in the project
    #[error("bucket already exists: {0}")]
    AlreadyExists(String),
}

/// The authoritative store of bucket records, keyed by `(project_id, name)`.
#[async_trait]
pub trait BucketCatalog: Send + Sync + std::fmt::Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// Get a bucket record
    ///
    /// # Returns
    /// * `Ok(Bucket)` - The bucket
    /// * `Err(CatalogError::NotFound)` - No such bucket in the project
    async fn get_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<Bucket, CatalogError<Self::Error>>;

    async fn has_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<bool, CatalogError<Self::Error>>;

    async fn count_buckets(&self, project_id: Uuid) -> Result<u64, CatalogError<Self::Error>>;

    /// Insert a new bucket record
    ///
    /// Must be atomic with respect to concurrent creates of the same
    ///  `(project_id, name)`: exactly one caller wins and the rest see
    ///  `Err(CatalogError::AlreadyExists)`.
    async fn create_bucket(&self, bucket: Bucket) -> Result<Bucket, CatalogError<Self::Error>>;

    /// List a page of buckets in name order
    ///
    /// # Arguments
    /// * `project_id` - The project to list
    /// * `opts` - Exclusive cursor, page size and direction
    /// * `allowed` - Names visible to the caller; applied before pagination
    ///
    /// # Returns
    /// * `Ok(BucketList)` - At most `opts.effective_limit()` items, and whether
    ///   more visible buckets exist past the page
    async fn list_buckets(
        &self,
        project_id: Uuid,
        opts: &ListOptions,
        allowed: &AllowedBuckets,
    ) -> Result<BucketList, CatalogError<Self::Error>>;

    /// Remove a bucket record unconditionally
    ///
    /// Does not look at the bucket's contents; callers that care about
    ///  emptiness check it first.
    async fn delete_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<(), CatalogError<Self::Error>>;
}
