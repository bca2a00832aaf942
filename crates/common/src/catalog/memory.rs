use async_trait::async_trait;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::provider::{BucketCatalog, CatalogError};
use crate::bucket::{Bucket, BucketList, ListDirection, ListOptions};
use crate::capability::AllowedBuckets;

/// In-memory bucket catalog
#[derive(Debug, Clone, Default)]
pub struct MemoryBucketCatalog {
    /// project_id -> name -> bucket; names kept sorted for listing
    inner: Arc<RwLock<HashMap<Uuid, BTreeMap<String, Bucket>>>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryBucketCatalogError {
    #[error("memory catalog error: {0}")]
    Internal(String),
}

impl MemoryBucketCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> CatalogError<MemoryBucketCatalogError> {
    CatalogError::Provider(MemoryBucketCatalogError::Internal(format!(
        "failed to acquire lock: {}",
        e
    )))
}

#[async_trait]
impl BucketCatalog for MemoryBucketCatalog {
    type Error = MemoryBucketCatalogError;

    async fn get_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<Bucket, CatalogError<Self::Error>> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .get(&project_id)
            .and_then(|buckets| buckets.get(name))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    async fn has_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<bool, CatalogError<Self::Error>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .get(&project_id)
            .map(|buckets| buckets.contains_key(name))
            .unwrap_or(false))
    }

    async fn count_buckets(&self, project_id: Uuid) -> Result<u64, CatalogError<Self::Error>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .get(&project_id)
            .map(|buckets| buckets.len() as u64)
            .unwrap_or(0))
    }

    async fn create_bucket(&self, bucket: Bucket) -> Result<Bucket, CatalogError<Self::Error>> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        match inner
            .entry(bucket.project_id)
            .or_default()
            .entry(bucket.name.clone())
        {
            Entry::Occupied(_) => Err(CatalogError::AlreadyExists(bucket.name)),
            Entry::Vacant(slot) => Ok(slot.insert(bucket).clone()),
        }
    }

    async fn list_buckets(
        &self,
        project_id: Uuid,
        opts: &ListOptions,
        allowed: &AllowedBuckets,
    ) -> Result<BucketList, CatalogError<Self::Error>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let Some(buckets) = inner.get(&project_id) else {
            return Ok(BucketList::default());
        };

        let limit = opts.effective_limit();
        let visible = |b: &&Bucket| allowed.contains(&b.name) && opts.is_after_cursor(&b.name);
        let mut items: Vec<Bucket> = match opts.direction {
            ListDirection::Forward => buckets
                .values()
                .filter(visible)
                .take(limit + 1)
                .cloned()
                .collect(),
            ListDirection::Backward => buckets
                .values()
                .rev()
                .filter(visible)
                .take(limit + 1)
                .cloned()
                .collect(),
        };

        let more = items.len() > limit;
        items.truncate(limit);
        Ok(BucketList { items, more })
    }

    async fn delete_bucket(
        &self,
        name: &str,
        project_id: Uuid,
    ) -> Result<(), CatalogError<Self::Error>> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner
            .get_mut(&project_id)
            .and_then(|buckets| buckets.remove(name))
            .map(|_| ())
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }
}
