//! Shared setup for HTTP-level tests
#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr};

use axum::body::Body;
use axum::Router;
use http::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use ::common::endpoint::EndpointConfig;
use ::common::pieces::{PieceDeletionQueue, PieceDeletionReceiver, PieceQueueConfig};
use strata_daemon::database::Database;
use strata_daemon::http_server::{self, Config};
use strata_daemon::ServiceState;

pub struct TestServer {
    pub state: ServiceState,
    pub api: Router,
    pub admin: Router,
    pub receiver: PieceDeletionReceiver,
}

pub async fn setup() -> TestServer {
    setup_with(EndpointConfig::default(), 2).await
}

pub async fn setup_with(endpoint: EndpointConfig, delete_batch_size: usize) -> TestServer {
    let database = Database::in_memory()
        .await
        .unwrap()
        .with_delete_batch_size(delete_batch_size);
    let (pieces, receiver) = PieceDeletionQueue::new(PieceQueueConfig::default());
    let state = ServiceState::from_database(database, pieces, endpoint);

    let config = Config::new(
        SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
        tracing::Level::DEBUG,
    );
    TestServer {
        api: http_server::api_router(&config, state.clone()),
        admin: http_server::admin_router(&config, state.clone()),
        state,
        receiver,
    }
}

impl TestServer {
    pub fn database(&self) -> &Database {
        self.state.database()
    }

    /// Create a project through the admin API and issue it a root token
    pub async fn project_with_token(&self, max_buckets: Option<u64>) -> (Uuid, String) {
        let (status, project) = send(
            &self.admin,
            Method::POST,
            "/admin/v0/projects",
            None,
            Some(serde_json::json!({ "max_buckets": max_buckets })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", project);
        let project_id: Uuid = serde_json::from_value(project["id"].clone()).unwrap();

        let (status, key) = send(
            &self.admin,
            Method::POST,
            &format!("/admin/v0/projects/{}/keys", project_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", key);
        let token = key["token"].as_str().unwrap().to_string();
        (project_id, token)
    }
}

pub async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

/// Send a request and decode the JSON response body
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = call(router, method, uri, token, body).await;
    let status = response.status();
    (status, json_body(response).await)
}

pub async fn json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST a raw, possibly malformed, JSON body
pub async fn post_raw(router: &Router, uri: &str, token: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {}", token))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

pub async fn post(router: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(token), Some(body)).await
}
