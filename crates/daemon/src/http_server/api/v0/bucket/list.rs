use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::bucket::ListDirection;
use common::endpoint::{ListBucketsRequest, ListBucketsResponse};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::error::{ApiJson, EndpointFailure};
use crate::http_server::api::Credential;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ListRequest {
    /// Resume after (or, with --backward, before) this bucket name
    #[serde(default)]
    #[arg(long, default_value = "")]
    pub cursor: String,

    /// Page size; 0 or anything above the server maximum uses the maximum
    #[serde(default)]
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Walk names in descending order
    #[serde(default)]
    #[arg(long)]
    pub backward: bool,
}

impl From<ListRequest> for ListBucketsRequest {
    fn from(req: ListRequest) -> Self {
        ListBucketsRequest {
            cursor: req.cursor,
            limit: req.limit,
            direction: if req.backward {
                ListDirection::Backward
            } else {
                ListDirection::Forward
            },
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Credential(header): Credential,
    ApiJson(req): ApiJson<ListBucketsRequest>,
) -> Result<Response, EndpointFailure> {
    let response = state.endpoint().list_buckets(&header, req).await?;
    Ok((http::StatusCode::OK, Json(response)).into_response())
}

impl ApiRequest for ListRequest {
    type Response = ListBucketsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/bucket/list")?;
        Ok(client.post(full_url).json(&ListBucketsRequest::from(self)))
    }
}
