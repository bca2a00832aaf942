//! Shared test utilities for endpoint integration tests
#![allow(dead_code)]

use ::common::bucket::BucketLocation;
use ::common::capability::{Capability, Caveat};
use ::common::catalog::MemoryBucketCatalog;
use ::common::endpoint::{CreateBucketRequest, Endpoint, EndpointConfig, RequestHeader};
use ::common::keys::MemoryKeyStore;
use ::common::metadata::{MemoryObjectMetadata, PieceLocation};
use ::common::pieces::{PieceDeletionQueue, PieceDeletionReceiver, PieceQueueConfig};
use ::common::projects::MemoryProjectSettings;
use uuid::Uuid;

pub type MemoryEndpoint =
    Endpoint<MemoryBucketCatalog, MemoryObjectMetadata, MemoryProjectSettings, MemoryKeyStore>;

pub struct TestEnv {
    pub endpoint: MemoryEndpoint,
    pub catalog: MemoryBucketCatalog,
    pub metadata: MemoryObjectMetadata,
    pub projects: MemoryProjectSettings,
    pub keys: MemoryKeyStore,
    pub receiver: PieceDeletionReceiver,
    pub project_id: Uuid,
    /// Unrestricted capability for `project_id`
    pub root: Capability,
}

/// Set up an endpoint over in-memory collaborators with one project and its root key
pub fn setup_test_env() -> TestEnv {
    setup_with_config(EndpointConfig::default())
}

pub fn setup_with_config(config: EndpointConfig) -> TestEnv {
    let catalog = MemoryBucketCatalog::new();
    let metadata = MemoryObjectMetadata::with_batch_size(2);
    let projects = MemoryProjectSettings::new();
    let keys = MemoryKeyStore::new();
    let (queue, receiver) = PieceDeletionQueue::new(PieceQueueConfig::default());

    let project_id = Uuid::new_v4();
    let root = keys.issue(project_id).unwrap();

    let endpoint = Endpoint::new(
        catalog.clone(),
        metadata.clone(),
        projects.clone(),
        keys.clone(),
        queue,
        config,
    );

    TestEnv {
        endpoint,
        catalog,
        metadata,
        projects,
        keys,
        receiver,
        project_id,
        root,
    }
}

impl TestEnv {
    pub fn root_header(&self) -> RequestHeader {
        header(&self.root)
    }

    /// Header for the root capability narrowed by `caveat`
    pub fn restricted_header(&self, caveat: Caveat) -> RequestHeader {
        header(&self.root.restrict(&caveat).unwrap())
    }

    pub async fn create(&self, name: &str) {
        self.endpoint
            .create_bucket(&self.root_header(), CreateBucketRequest::new(name))
            .await
            .unwrap();
    }

    /// Store `count` single-segment objects in the bucket
    pub fn put_objects(&self, bucket: &str, count: usize) {
        let location = self.location(bucket);
        for i in 0..count {
            self.metadata
                .put_object(
                    &location,
                    format!("object-{:04}", i),
                    vec![vec![
                        PieceLocation {
                            node_id: "node-a".to_string(),
                            piece_num: 0,
                        },
                        PieceLocation {
                            node_id: "node-b".to_string(),
                            piece_num: 1,
                        },
                    ]],
                )
                .unwrap();
        }
    }

    pub fn location(&self, bucket: &str) -> BucketLocation {
        BucketLocation::new(self.project_id, bucket)
    }
}

pub fn header(capability: &Capability) -> RequestHeader {
    RequestHeader::new(capability.serialize())
}
