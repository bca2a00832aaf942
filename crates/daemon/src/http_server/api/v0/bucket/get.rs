use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::endpoint::{GetBucketRequest, GetBucketResponse};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::error::{ApiJson, EndpointFailure};
use crate::http_server::api::Credential;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct GetRequest {
    /// Name of the bucket
    #[arg(long)]
    pub name: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Credential(header): Credential,
    ApiJson(req): ApiJson<GetBucketRequest>,
) -> Result<Response, EndpointFailure> {
    let response = state.endpoint().get_bucket(&header, req).await?;
    Ok((http::StatusCode::OK, Json(response)).into_response())
}

impl ApiRequest for GetRequest {
    type Response = GetBucketResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/bucket/get")?;
        Ok(client
            .post(full_url)
            .json(&GetBucketRequest { name: self.name }))
    }
}
