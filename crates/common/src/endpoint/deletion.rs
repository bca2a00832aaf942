//! Bucket removal across the catalog and the object metadata store.
//!
//! The two stores share no transaction. A forced delete drains the bucket's
//! objects first and only then removes the record, re-checking emptiness on the
//! way. Writers racing the drain are not locked out; if they win, the caller
//! gets a retryable outcome instead of a half-deleted bucket.

use uuid::Uuid;

use super::error::EndpointError;
use crate::bucket::BucketLocation;
use crate::catalog::{BucketCatalog, CatalogError};
use crate::metadata::{DeletedSegmentInfo, ObjectMetadata};
use crate::pieces::PieceDeletionQueue;

/// Result of removing a bucket that must already be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    NotEmpty,
    NotFound,
}

/// Result of a forced delete. Every variant carries the number of objects the
/// drain removed, since those deletions stand regardless of the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The bucket record was removed after the drain.
    Deleted { deleted_objects: u64 },
    /// Someone else removed the record first.
    AlreadyGone { deleted_objects: u64 },
    /// New objects arrived between the drain and the removal.
    Repopulated { deleted_objects: u64 },
}

impl DeletionOutcome {
    pub fn deleted_objects(&self) -> u64 {
        match *self {
            DeletionOutcome::Deleted { deleted_objects }
            | DeletionOutcome::AlreadyGone { deleted_objects }
            | DeletionOutcome::Repopulated { deleted_objects } => deleted_objects,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPhase {
    Draining,
    Removing { deleted_objects: u64 },
    Done(DeletionOutcome),
}

/// One in-flight forced delete. Never persisted.
#[derive(Debug, Clone)]
pub struct DeletionJob {
    location: BucketLocation,
    phase: DeletionPhase,
}

impl DeletionJob {
    pub fn new(location: BucketLocation) -> Self {
        Self {
            location,
            phase: DeletionPhase::Draining,
        }
    }

    pub fn location(&self) -> &BucketLocation {
        &self.location
    }

    pub fn phase(&self) -> DeletionPhase {
        self.phase
    }
}

#[derive(Debug, Clone)]
pub struct EmptinessCoordinator<C, M> {
    catalog: C,
    metadata: M,
    pieces: PieceDeletionQueue,
}

impl<C: BucketCatalog, M: ObjectMetadata> EmptinessCoordinator<C, M> {
    pub fn new(catalog: C, metadata: M, pieces: PieceDeletionQueue) -> Self {
        Self {
            catalog,
            metadata,
            pieces,
        }
    }

    pub async fn is_empty(&self, project_id: Uuid, name: &str) -> Result<bool, EndpointError> {
        let location = BucketLocation::new(project_id, name);
        self.metadata
            .bucket_empty(&location)
            .await
            .map_err(|e| EndpointError::internal("checking bucket emptiness", e))
    }

    /// Remove the bucket record only if no objects remain. Takes no action
    /// on a non-empty bucket.
    pub async fn delete_bucket(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<Removal, EndpointError> {
        if !self.is_empty(project_id, name).await? {
            return Ok(Removal::NotEmpty);
        }
        match self.catalog.delete_bucket(name, project_id).await {
            Ok(()) => Ok(Removal::Deleted),
            Err(CatalogError::NotFound(_)) => Ok(Removal::NotFound),
            Err(e) => Err(EndpointError::from_catalog("deleting bucket record", e)),
        }
    }

    /// Drain every object in the bucket, then remove the record.
    pub async fn force_delete_bucket(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> Result<DeletionOutcome, EndpointError> {
        let mut job = DeletionJob::new(BucketLocation::new(project_id, name));
        loop {
            if let DeletionPhase::Done(outcome) = job.phase {
                return Ok(outcome);
            }
            self.advance(&mut job).await?;
        }
    }

    /// Run the current phase of `job` and move it to the next.
    pub async fn advance(&self, job: &mut DeletionJob) -> Result<(), EndpointError> {
        job.phase = match job.phase {
            DeletionPhase::Draining => {
                let pieces = &self.pieces;
                let deleted_objects = self
                    .metadata
                    .delete_bucket_objects(&job.location, &|batch: Vec<DeletedSegmentInfo>| {
                        pieces.notify(batch)
                    })
                    .await
                    .map_err(|e| EndpointError::internal("draining bucket objects", e))?;
                tracing::debug!(bucket = %job.location, deleted_objects, "bucket drained");
                DeletionPhase::Removing { deleted_objects }
            }
            DeletionPhase::Removing { deleted_objects } => {
                let location = &job.location;
                let removal = self
                    .delete_bucket(location.project_id, &location.bucket_name)
                    .await?;
                let outcome = match removal {
                    Removal::Deleted => DeletionOutcome::Deleted { deleted_objects },
                    Removal::NotFound => DeletionOutcome::AlreadyGone { deleted_objects },
                    Removal::NotEmpty => {
                        tracing::warn!(bucket = %location, deleted_objects, "bucket repopulated during forced delete");
                        DeletionOutcome::Repopulated { deleted_objects }
                    }
                };
                DeletionPhase::Done(outcome)
            }
            DeletionPhase::Done(outcome) => DeletionPhase::Done(outcome),
        };
        Ok(())
    }
}
