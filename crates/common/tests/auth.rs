//! Integration tests for credential handling across endpoint operations

mod common;

use ::common::capability::{Capability, Caveat};
use ::common::endpoint::{
    CreateBucketRequest, EndpointError, GetBucketRequest, ListBucketsRequest, RequestHeader,
};
use time::OffsetDateTime;

fn get(name: &str) -> GetBucketRequest {
    GetBucketRequest {
        name: name.to_string(),
    }
}

#[tokio::test]
async fn test_credentials_are_scoped_to_their_project() {
    let env = common::setup_test_env();
    env.create("photos").await;

    // a second project's key sees its own, empty, namespace
    let other_project = uuid::Uuid::new_v4();
    let other = env.keys.issue(other_project).unwrap();
    let result = env.endpoint.get_bucket(&common::header(&other), get("photos")).await;
    assert!(matches!(result, Err(EndpointError::NotFound(_))));

    env.endpoint
        .create_bucket(&common::header(&other), CreateBucketRequest::new("photos"))
        .await
        .unwrap();
    assert_eq!(env.endpoint.count_buckets(env.project_id).await.unwrap(), 1);
    assert_eq!(env.endpoint.count_buckets(other_project).await.unwrap(), 1);
}

#[tokio::test]
async fn test_garbage_and_forged_credentials() {
    let env = common::setup_test_env();
    env.create("photos").await;

    let result = env
        .endpoint
        .get_bucket(&RequestHeader::new("not a capability"), get("photos"))
        .await;
    assert!(matches!(result, Err(EndpointError::InvalidCredential(_))));

    // same head, different secret
    let forged = Capability::new(env.root.head().to_vec(), &Capability::generate_secret());
    let result = env.endpoint.get_bucket(&common::header(&forged), get("photos")).await;
    assert!(matches!(result, Err(EndpointError::InvalidCredential(_))));
}

#[tokio::test]
async fn test_time_window() {
    let env = common::setup_test_env();
    env.create("photos").await;
    let now = OffsetDateTime::now_utc().unix_timestamp();

    let future = env.restricted_header(Caveat {
        not_before: Some(now + 3600),
        ..Default::default()
    });
    let result = env.endpoint.get_bucket(&future, get("photos")).await;
    assert!(matches!(result, Err(EndpointError::InvalidCredential(_))));

    let expired = env.restricted_header(Caveat {
        not_after: Some(now - 3600),
        ..Default::default()
    });
    let result = env
        .endpoint
        .list_buckets(&expired, ListBucketsRequest::default())
        .await;
    assert!(matches!(result, Err(EndpointError::InvalidCredential(_))));

    let current = env.restricted_header(Caveat {
        not_before: Some(now - 60),
        not_after: Some(now + 3600),
        ..Default::default()
    });
    assert!(env.endpoint.get_bucket(&current, get("photos")).await.is_ok());
}

#[tokio::test]
async fn test_bucket_restricted_credential() {
    let env = common::setup_test_env();
    env.create("photos").await;
    env.create("music").await;

    let header = env.restricted_header(Caveat {
        allowed_buckets: vec!["photos".to_string()],
        ..Default::default()
    });
    assert!(env.endpoint.get_bucket(&header, get("photos")).await.is_ok());
    let result = env.endpoint.get_bucket(&header, get("music")).await;
    assert!(matches!(result, Err(EndpointError::Forbidden(_))));
}

#[tokio::test]
async fn test_authorization_precedes_validation() {
    let env = common::setup_test_env();
    let header = env.restricted_header(Caveat {
        disallow_writes: true,
        ..Default::default()
    });
    // the name is invalid too, but the credential is checked first
    let result = env
        .endpoint
        .create_bucket(&header, CreateBucketRequest::new("BAD"))
        .await;
    assert!(matches!(result, Err(EndpointError::Forbidden(_))));
}
