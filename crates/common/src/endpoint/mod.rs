//! The bucket endpoint
//!
//! Every operation authorizes first, then runs its policy (quota on create,
//! the emptiness protocol on delete), touches the catalog, and converts the
//! result for the wire. Each request builds its own [`Action`]s from a single
//! timestamp, so all checks made for it agree on the current time.

mod auth;
mod convert;
mod deletion;
mod error;
mod quota;
mod types;

use time::OffsetDateTime;
use uuid::Uuid;

pub use auth::{Authorization, AuthorizationGate, PermissionGrant};
pub use convert::{
    CipherSuite, EncryptionParameters, EndpointConfig, ProtocolAdapter, RedundancyAlgorithm,
    RedundancyScheme, DEFAULT_MAX_BUCKETS, DEFAULT_MAX_SEGMENT_SIZE,
};
pub use deletion::{DeletionJob, DeletionOutcome, DeletionPhase, EmptinessCoordinator, Removal};
pub use error::EndpointError;
pub use quota::QuotaPolicy;
pub use types::{
    BucketInfo, BucketListItem, CreateBucketRequest, CreateBucketResponse, DeleteBucketRequest,
    DeleteBucketResponse, GetBucketRequest, GetBucketResponse, ListBucketsRequest,
    ListBucketsResponse, RequestHeader,
};

use crate::bucket::ListOptions;
use crate::capability::{Action, Operation};
use crate::catalog::{BucketCatalog, CatalogError};
use crate::keys::KeyResolver;
use crate::metadata::ObjectMetadata;
use crate::pieces::PieceDeletionQueue;
use crate::projects::ProjectSettings;

#[derive(Debug, Clone)]
pub struct Endpoint<C, M, P, K> {
    gate: AuthorizationGate<K>,
    catalog: C,
    quota: QuotaPolicy<C, P>,
    coordinator: EmptinessCoordinator<C, M>,
    adapter: ProtocolAdapter,
}

impl<C, M, P, K> Endpoint<C, M, P, K>
where
    C: BucketCatalog,
    M: ObjectMetadata,
    P: ProjectSettings,
    K: KeyResolver,
{
    pub fn new(
        catalog: C,
        metadata: M,
        projects: P,
        keys: K,
        pieces: PieceDeletionQueue,
        config: EndpointConfig,
    ) -> Self {
        Self {
            gate: AuthorizationGate::new(keys),
            quota: QuotaPolicy::new(catalog.clone(), projects, config.max_buckets),
            coordinator: EmptinessCoordinator::new(catalog.clone(), metadata, pieces),
            catalog,
            adapter: ProtocolAdapter::new(config),
        }
    }

    pub fn config(&self) -> &EndpointConfig {
        self.adapter.config()
    }

    #[tracing::instrument(skip(self, header), fields(bucket = %req.name))]
    pub async fn get_bucket(
        &self,
        header: &RequestHeader,
        req: GetBucketRequest,
    ) -> Result<GetBucketResponse, EndpointError> {
        let action = Action::new(Operation::Read, &req.name, OffsetDateTime::now_utc());
        let auth = self.gate.authorize(header, &action, &[]).await?;

        let bucket = self
            .catalog
            .get_bucket(&req.name, auth.project_id())
            .await
            .map_err(|e| EndpointError::from_catalog("getting bucket", e))?;

        Ok(GetBucketResponse {
            bucket: self.adapter.to_wire(Some(&bucket)),
        })
    }

    #[tracing::instrument(skip(self, header), fields(bucket = %req.name))]
    pub async fn create_bucket(
        &self,
        header: &RequestHeader,
        req: CreateBucketRequest,
    ) -> Result<CreateBucketResponse, EndpointError> {
        let action = Action::new(Operation::Write, &req.name, OffsetDateTime::now_utc());
        let auth = self.gate.authorize(header, &action, &[]).await?;
        let project_id = auth.project_id();

        self.adapter.validate_name(&req.name)?;

        let exists = self
            .catalog
            .has_bucket(&req.name, project_id)
            .await
            .map_err(|e| EndpointError::from_catalog("checking bucket existence", e))?;
        if exists {
            return Err(EndpointError::AlreadyExists(format!(
                "bucket already exists: {}",
                req.name
            )));
        }

        self.quota.check_quota(project_id).await?;

        let bucket = self
            .adapter
            .bucket_from_request(project_id, header.user_agent.as_deref(), &req)?;
        let bucket = self
            .catalog
            .create_bucket(bucket)
            .await
            .map_err(|e| EndpointError::from_catalog("creating bucket", e))?;

        tracing::info!(%project_id, bucket_id = %bucket.id, "bucket created");
        Ok(CreateBucketResponse {
            bucket: self.adapter.to_wire(Some(&bucket)),
        })
    }

    /// Delete a bucket, draining it first when `delete_all` is set.
    ///
    /// A missing bucket is not an error. Callers without Read or List on the
    /// bucket learn nothing about it: they get an empty response whether the
    /// bucket was deleted, missing, or still holds objects.
    #[tracing::instrument(skip(self, header), fields(bucket = %req.name, delete_all = req.delete_all))]
    pub async fn delete_bucket(
        &self,
        header: &RequestHeader,
        req: DeleteBucketRequest,
    ) -> Result<DeleteBucketResponse, EndpointError> {
        let now = OffsetDateTime::now_utc();
        let auth = self
            .gate
            .authorize(
                header,
                &Action::new(Operation::Delete, &req.name, now),
                &[
                    Action::new(Operation::Read, &req.name, now),
                    Action::new(Operation::List, &req.name, now),
                ],
            )
            .await?;
        let (can_read, can_list) = (auth.granted(0), auth.granted(1));
        let project_id = auth.project_id();

        self.adapter.validate_name(&req.name)?;

        let mut snapshot = None;
        if can_read || can_list {
            match self.catalog.get_bucket(&req.name, project_id).await {
                Ok(bucket) => snapshot = self.adapter.to_wire(Some(&bucket)),
                Err(CatalogError::NotFound(_)) => return Ok(DeleteBucketResponse::default()),
                Err(e) => return Err(EndpointError::from_catalog("getting bucket", e)),
            }
        }

        match self.coordinator.delete_bucket(project_id, &req.name).await? {
            Removal::Deleted | Removal::NotFound => Ok(DeleteBucketResponse {
                bucket: snapshot,
                deleted_objects_count: 0,
            }),
            Removal::NotEmpty if !can_read && !can_list => Ok(DeleteBucketResponse::default()),
            Removal::NotEmpty if !req.delete_all || !can_list => Err(
                EndpointError::FailedPrecondition("bucket not empty".to_string()),
            ),
            Removal::NotEmpty => {
                let outcome = self
                    .coordinator
                    .force_delete_bucket(project_id, &req.name)
                    .await?;
                let deleted_objects = outcome.deleted_objects();
                match outcome {
                    DeletionOutcome::Deleted { .. } | DeletionOutcome::AlreadyGone { .. } => {
                        tracing::info!(%project_id, deleted_objects, "bucket deleted with contents");
                        Ok(DeleteBucketResponse {
                            bucket: snapshot,
                            deleted_objects_count: deleted_objects,
                        })
                    }
                    DeletionOutcome::Repopulated { .. } => Err(EndpointError::FailedPrecondition(
                        format!(
                            "cannot delete the bucket because it's being used by another process; {} objects were deleted",
                            deleted_objects
                        ),
                    )),
                }
            }
        }
    }

    /// List the buckets the credential may see.
    #[tracing::instrument(skip(self, header))]
    pub async fn list_buckets(
        &self,
        header: &RequestHeader,
        req: ListBucketsRequest,
    ) -> Result<ListBucketsResponse, EndpointError> {
        let action = Action::new(Operation::List, "", OffsetDateTime::now_utc());
        let auth = self.gate.authorize(header, &action, &[]).await?;
        let allowed = auth.allowed_buckets(&action)?;

        let opts = ListOptions {
            cursor: req.cursor,
            limit: req.limit,
            direction: req.direction,
        };
        let list = self
            .catalog
            .list_buckets(auth.project_id(), &opts, &allowed)
            .await
            .map_err(|e| EndpointError::from_catalog("listing buckets", e))?;

        Ok(ListBucketsResponse {
            items: list
                .items
                .iter()
                .map(|b| self.adapter.to_list_item(b))
                .collect(),
            more: list.more,
        })
    }

    /// Number of buckets in a project. Privileged; performs no authorization.
    pub async fn count_buckets(&self, project_id: Uuid) -> Result<u64, EndpointError> {
        self.catalog
            .count_buckets(project_id)
            .await
            .map_err(|e| EndpointError::from_catalog("counting buckets", e))
    }

    /// The project's effective bucket ceiling.
    pub async fn max_buckets(&self, project_id: Uuid) -> Result<u64, EndpointError> {
        self.quota.max_buckets(project_id).await
    }
}
