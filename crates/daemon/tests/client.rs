//! The typed API client against live listeners

mod common;

use reqwest::StatusCode;
use url::Url;

use strata_daemon::http_server::admin::v0::{CountRequest, CreateProjectRequest, IssueKeyRequest};
use strata_daemon::http_server::api::client::{ApiClient, ApiError};
use strata_daemon::http_server::api::v0::bucket::{
    CreateRequest, DeleteRequest, GetRequest, ListRequest,
};

async fn serve(router: axum::Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn test_client_round_trip() {
    let server = common::setup().await;
    let api_url = serve(server.api.clone()).await;
    let admin_url = serve(server.admin.clone()).await;

    let mut admin = ApiClient::new(&admin_url).unwrap();
    let project = admin
        .call(CreateProjectRequest {
            max_buckets: Some(5),
        })
        .await
        .unwrap();
    let key = admin
        .call(IssueKeyRequest {
            project_id: project.id,
        })
        .await
        .unwrap();

    let mut client = ApiClient::new(&api_url).unwrap().with_token(key.token);
    let created = client
        .call(CreateRequest {
            name: "photos".to_string(),
            partner_id: None,
        })
        .await
        .unwrap();
    assert_eq!(created.bucket.unwrap().name, "photos");

    let fetched = client
        .call(GetRequest {
            name: "photos".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(fetched.bucket.unwrap().name, "photos");

    let listed = client.call(ListRequest::default()).await.unwrap();
    assert_eq!(listed.items.len(), 1);

    let counted = admin
        .call(CountRequest {
            project_id: project.id,
        })
        .await
        .unwrap();
    assert_eq!((counted.count, counted.max_buckets), (1, 5));

    let deleted = client
        .call(DeleteRequest {
            name: "photos".to_string(),
            delete_all: false,
        })
        .await
        .unwrap();
    assert_eq!(deleted.deleted_objects_count, 0);

    // structured errors come back typed
    let err = client
        .call(GetRequest {
            name: "photos".to_string(),
        })
        .await
        .unwrap_err();
    match err {
        ApiError::Endpoint { status, code, .. } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(code, "not_found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_client_without_token_is_unauthorized() {
    let server = common::setup().await;
    let api_url = serve(server.api.clone()).await;

    let mut client = ApiClient::new(&api_url).unwrap();
    let err = client.call(ListRequest::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
}
