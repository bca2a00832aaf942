//! Integration tests for bucket deletion

mod common;

use async_trait::async_trait;

use ::common::bucket::BucketLocation;
use ::common::capability::Caveat;
use ::common::catalog::{BucketCatalog, MemoryBucketCatalog};
use ::common::endpoint::{
    CreateBucketRequest, DeleteBucketRequest, Endpoint, EndpointConfig, EndpointError,
    GetBucketRequest, RequestHeader,
};
use ::common::keys::MemoryKeyStore;
use ::common::metadata::{
    MemoryObjectMetadata, MemoryObjectMetadataError, ObjectMetadata, OnDeletedSegments,
};
use ::common::pieces::{PieceDeletionQueue, PieceQueueConfig};
use ::common::projects::MemoryProjectSettings;

fn delete(name: &str, delete_all: bool) -> DeleteBucketRequest {
    DeleteBucketRequest {
        name: name.to_string(),
        delete_all,
    }
}

#[tokio::test]
async fn test_delete_empty_bucket_returns_snapshot() {
    let env = common::setup_test_env();
    env.create("photos").await;

    let resp = env
        .endpoint
        .delete_bucket(&env.root_header(), delete("photos", false))
        .await
        .unwrap();

    assert_eq!(resp.bucket.unwrap().name, "photos");
    assert_eq!(resp.deleted_objects_count, 0);
    assert!(!env.catalog.has_bucket("photos", env.project_id).await.unwrap());
}

#[tokio::test]
async fn test_non_empty_bucket_scenario() {
    let env = common::setup_test_env();
    env.create("b-bucket").await;
    env.put_objects("b-bucket", 3);

    let result = env
        .endpoint
        .delete_bucket(&env.root_header(), delete("b-bucket", false))
        .await;
    assert!(matches!(result, Err(EndpointError::FailedPrecondition(_))));
    assert!(env.catalog.has_bucket("b-bucket", env.project_id).await.unwrap());
    assert_eq!(env.metadata.object_count(&env.location("b-bucket")).unwrap(), 3);

    let resp = env
        .endpoint
        .delete_bucket(&env.root_header(), delete("b-bucket", true))
        .await
        .unwrap();
    assert_eq!(resp.deleted_objects_count, 3);
    assert_eq!(resp.bucket.unwrap().name, "b-bucket");

    let result = env
        .endpoint
        .get_bucket(
            &env.root_header(),
            GetBucketRequest {
                name: "b-bucket".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(EndpointError::NotFound(_))));
    assert_eq!(env.metadata.object_count(&env.location("b-bucket")).unwrap(), 0);
}

#[tokio::test]
async fn test_forced_delete_queues_every_piece() {
    let env = common::setup_test_env();
    env.create("photos").await;
    env.put_objects("photos", 5);

    env.endpoint
        .delete_bucket(&env.root_header(), delete("photos", true))
        .await
        .unwrap();

    let segments: Vec<_> = env.receiver.drain().into_iter().flatten().collect();
    assert_eq!(segments.len(), 5);
    assert!(segments.iter().all(|s| s.pieces.len() == 2));
}

#[tokio::test]
async fn test_forced_delete_survives_stopped_piece_worker() {
    let common::TestEnv {
        endpoint,
        catalog,
        metadata,
        receiver,
        project_id,
        root,
        ..
    } = common::setup_test_env();
    drop(receiver);

    let header = common::header(&root);
    endpoint
        .create_bucket(
            &header,
            ::common::endpoint::CreateBucketRequest::new("photos"),
        )
        .await
        .unwrap();
    metadata
        .put_object(
            &::common::bucket::BucketLocation::new(project_id, "photos"),
            "only",
            Vec::new(),
        )
        .unwrap();

    let resp = endpoint
        .delete_bucket(&header, delete("photos", true))
        .await
        .unwrap();
    assert_eq!(resp.deleted_objects_count, 1);
    assert!(!catalog.has_bucket("photos", project_id).await.unwrap());
}

#[tokio::test]
async fn test_delete_all_requires_list_permission() {
    let env = common::setup_test_env();
    env.create("photos").await;
    env.put_objects("photos", 2);

    let header = env.restricted_header(Caveat {
        disallow_lists: true,
        ..Default::default()
    });
    let result = env.endpoint.delete_bucket(&header, delete("photos", true)).await;
    assert!(matches!(result, Err(EndpointError::FailedPrecondition(_))));
    assert_eq!(env.metadata.object_count(&env.location("photos")).unwrap(), 2);
}

#[tokio::test]
async fn test_delete_missing_bucket_is_success() {
    let env = common::setup_test_env();
    let resp = env
        .endpoint
        .delete_bucket(&env.root_header(), delete("ghost", false))
        .await
        .unwrap();
    assert!(resp.bucket.is_none());
    assert_eq!(resp.deleted_objects_count, 0);
}

#[tokio::test]
async fn test_delete_only_credential_learns_nothing() {
    let env = common::setup_test_env();
    env.create("photos").await;
    env.put_objects("photos", 1);
    env.create("empty").await;

    let header = env.restricted_header(Caveat {
        disallow_reads: true,
        disallow_lists: true,
        ..Default::default()
    });

    // non-empty: nothing happens, nothing is revealed
    let resp = env.endpoint.delete_bucket(&header, delete("photos", true)).await.unwrap();
    assert!(resp.bucket.is_none());
    assert_eq!(resp.deleted_objects_count, 0);
    assert!(env.catalog.has_bucket("photos", env.project_id).await.unwrap());

    // empty: deleted, still nothing revealed
    let resp = env.endpoint.delete_bucket(&header, delete("empty", false)).await.unwrap();
    assert!(resp.bucket.is_none());
    assert!(!env.catalog.has_bucket("empty", env.project_id).await.unwrap());

    // missing: indistinguishable
    let resp = env.endpoint.delete_bucket(&header, delete("ghost", false)).await.unwrap();
    assert!(resp.bucket.is_none());
}

#[tokio::test]
async fn test_delete_forbidden_without_delete_permission() {
    let env = common::setup_test_env();
    env.create("photos").await;
    let header = env.restricted_header(Caveat {
        disallow_deletes: true,
        ..Default::default()
    });
    let result = env.endpoint.delete_bucket(&header, delete("photos", false)).await;
    assert!(matches!(result, Err(EndpointError::Forbidden(_))));
    assert!(env.catalog.has_bucket("photos", env.project_id).await.unwrap());
}

#[tokio::test]
async fn test_delete_outside_allowed_buckets_is_forbidden() {
    let env = common::setup_test_env();
    env.create("photos").await;
    let header = env.restricted_header(Caveat {
        allowed_buckets: vec!["music".to_string()],
        ..Default::default()
    });
    let result = env.endpoint.delete_bucket(&header, delete("photos", false)).await;
    assert!(matches!(result, Err(EndpointError::Forbidden(_))));
}

/// What another client does between the drain and the record removal
#[derive(Debug, Clone, Copy)]
enum Interleaved {
    /// uploads a new object into the bucket
    Upload,
    /// deletes the bucket record itself
    DeleteRecord,
}

/// Object metadata that lets a concurrent writer act right after each drain
#[derive(Debug, Clone)]
struct InterleavedMetadata {
    inner: MemoryObjectMetadata,
    catalog: MemoryBucketCatalog,
    interleaved: Interleaved,
}

#[async_trait]
impl ObjectMetadata for InterleavedMetadata {
    type Error = MemoryObjectMetadataError;

    async fn bucket_empty(&self, bucket: &BucketLocation) -> Result<bool, Self::Error> {
        self.inner.bucket_empty(bucket).await
    }

    async fn delete_bucket_objects(
        &self,
        bucket: &BucketLocation,
        on_deleted: OnDeletedSegments<'_>,
    ) -> Result<u64, Self::Error> {
        let deleted = self.inner.delete_bucket_objects(bucket, on_deleted).await?;
        match self.interleaved {
            Interleaved::Upload => self.inner.put_object(bucket, "late-upload", Vec::new())?,
            Interleaved::DeleteRecord => {
                self.catalog
                    .delete_bucket(&bucket.bucket_name, bucket.project_id)
                    .await
                    .map_err(|e| MemoryObjectMetadataError::Internal(e.to_string()))?;
            }
        }
        Ok(deleted)
    }
}

type InterleavedEndpoint =
    Endpoint<MemoryBucketCatalog, InterleavedMetadata, MemoryProjectSettings, MemoryKeyStore>;

struct InterleavedEnv {
    endpoint: InterleavedEndpoint,
    catalog: MemoryBucketCatalog,
    metadata: InterleavedMetadata,
    header: RequestHeader,
    location: BucketLocation,
}

/// A bucket named `photos` holding `objects` objects, behind an endpoint
/// whose drains are followed by `interleaved`
async fn interleaved_env(interleaved: Interleaved, objects: usize) -> InterleavedEnv {
    let catalog = MemoryBucketCatalog::new();
    let metadata = InterleavedMetadata {
        inner: MemoryObjectMetadata::with_batch_size(2),
        catalog: catalog.clone(),
        interleaved,
    };
    let keys = MemoryKeyStore::new();
    let (queue, _receiver) = PieceDeletionQueue::new(PieceQueueConfig::default());
    let project_id = uuid::Uuid::new_v4();
    let header = common::header(&keys.issue(project_id).unwrap());

    let endpoint = Endpoint::new(
        catalog.clone(),
        metadata.clone(),
        MemoryProjectSettings::new(),
        keys,
        queue,
        EndpointConfig::default(),
    );
    endpoint
        .create_bucket(&header, CreateBucketRequest::new("photos"))
        .await
        .unwrap();

    let location = BucketLocation::new(project_id, "photos");
    for i in 0..objects {
        metadata
            .inner
            .put_object(&location, format!("object-{}", i), Vec::new())
            .unwrap();
    }

    InterleavedEnv {
        endpoint,
        catalog,
        metadata,
        header,
        location,
    }
}

#[tokio::test]
async fn test_forced_delete_reports_upload_during_drain() {
    let InterleavedEnv {
        endpoint,
        catalog,
        metadata,
        header,
        location,
    } = interleaved_env(Interleaved::Upload, 3).await;

    let result = endpoint.delete_bucket(&header, delete("photos", true)).await;
    match result {
        Err(EndpointError::FailedPrecondition(message)) => {
            assert!(message.contains("being used by another process"), "{}", message);
            assert!(message.contains("3 objects"), "{}", message);
        }
        other => panic!("expected FailedPrecondition, got {:?}", other),
    }

    // the record survives with only the late object left in it
    assert!(catalog.has_bucket("photos", location.project_id).await.unwrap());
    assert_eq!(metadata.inner.object_count(&location).unwrap(), 1);
}

#[tokio::test]
async fn test_forced_delete_tolerates_concurrent_record_delete() {
    let InterleavedEnv {
        endpoint,
        catalog,
        metadata,
        header,
        location,
    } = interleaved_env(Interleaved::DeleteRecord, 3).await;

    let resp = endpoint
        .delete_bucket(&header, delete("photos", true))
        .await
        .unwrap();

    assert_eq!(resp.deleted_objects_count, 3);
    assert_eq!(resp.bucket.unwrap().name, "photos");
    assert!(!catalog.has_bucket("photos", location.project_id).await.unwrap());
    assert_eq!(metadata.inner.object_count(&location).unwrap(), 0);
}
