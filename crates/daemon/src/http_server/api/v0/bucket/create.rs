use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::endpoint::{CreateBucketRequest, CreateBucketResponse};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::error::{ApiJson, EndpointFailure};
use crate::http_server::api::Credential;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateRequest {
    /// Name of the bucket to create
    #[arg(long)]
    pub name: String,

    /// Partner the bucket is attributed to
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    pub partner_id: Option<String>,
}

impl From<CreateRequest> for CreateBucketRequest {
    fn from(req: CreateRequest) -> Self {
        CreateBucketRequest {
            partner_id: req.partner_id,
            ..CreateBucketRequest::new(req.name)
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Credential(header): Credential,
    ApiJson(req): ApiJson<CreateBucketRequest>,
) -> Result<Response, EndpointFailure> {
    let response = state.endpoint().create_bucket(&header, req).await?;
    Ok((http::StatusCode::CREATED, Json(response)).into_response())
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateRequest {
    type Response = CreateBucketResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/bucket")?;
        Ok(client.post(full_url).json(&CreateBucketRequest::from(self)))
    }
}
