use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::endpoint::{DeleteBucketRequest, DeleteBucketResponse};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::error::{ApiJson, EndpointFailure};
use crate::http_server::api::Credential;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteRequest {
    /// Name of the bucket to delete
    #[arg(long)]
    pub name: String,

    /// Delete every object in the bucket first
    #[serde(default)]
    #[arg(long)]
    pub delete_all: bool,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Credential(header): Credential,
    ApiJson(req): ApiJson<DeleteBucketRequest>,
) -> Result<Response, EndpointFailure> {
    let response = state.endpoint().delete_bucket(&header, req).await?;
    Ok((http::StatusCode::OK, Json(response)).into_response())
}

impl ApiRequest for DeleteRequest {
    type Response = DeleteBucketResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/bucket/delete")?;
        Ok(client.post(full_url).json(&DeleteBucketRequest {
            name: self.name,
            delete_all: self.delete_all,
        }))
    }
}
