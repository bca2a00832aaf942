use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Project;
use crate::http_server::admin::AdminError;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::error::ApiJson;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct CreateProjectRequest {
    /// Bucket ceiling for the project (defaults to the system-wide limit)
    #[serde(default)]
    #[arg(long)]
    pub max_buckets: Option<u64>,
}

pub async fn create_handler(
    State(state): State<ServiceState>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> Result<Response, AdminError> {
    let project = state.database().create_project(req.max_buckets).await?;
    tracing::info!(project_id = %project.id, max_buckets = ?project.max_buckets, "project created");
    Ok((http::StatusCode::CREATED, Json(project)).into_response())
}

impl ApiRequest for CreateProjectRequest {
    type Response = Project;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/admin/v0/projects")?;
        Ok(client.post(full_url).json(&self))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct SetLimitRequest {
    /// Project to update
    #[serde(skip)]
    #[arg(long)]
    pub project_id: Uuid,

    /// New bucket ceiling; omit to fall back to the system-wide limit
    #[serde(default)]
    #[arg(long)]
    pub max_buckets: Option<u64>,
}

pub async fn limit_handler(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<SetLimitRequest>,
) -> Result<Response, AdminError> {
    if !state.database().set_max_buckets(id, req.max_buckets).await? {
        return Err(AdminError::ProjectNotFound(id));
    }
    let project = state
        .database()
        .get_project(id)
        .await?
        .ok_or(AdminError::ProjectNotFound(id))?;
    tracing::info!(project_id = %id, max_buckets = ?req.max_buckets, "project limit updated");
    Ok((http::StatusCode::OK, Json(project)).into_response())
}

impl ApiRequest for SetLimitRequest {
    type Response = Project;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join(&format!("/admin/v0/projects/{}/limits", self.project_id))?;
        Ok(client.put(full_url).json(&self))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CountRequest {
    /// Project to count buckets for
    #[arg(long)]
    pub project_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub project_id: Uuid,
    pub count: u64,
    /// Effective ceiling, after falling back to the system-wide default
    pub max_buckets: u64,
}

pub async fn count_handler(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AdminError> {
    if state.database().get_project(id).await?.is_none() {
        return Err(AdminError::ProjectNotFound(id));
    }
    let count = state.endpoint().count_buckets(id).await?;
    let max_buckets = state.endpoint().max_buckets(id).await?;
    Ok((
        http::StatusCode::OK,
        Json(CountResponse {
            project_id: id,
            count,
            max_buckets,
        }),
    )
        .into_response())
}

impl ApiRequest for CountRequest {
    type Response = CountResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join(&format!(
            "/admin/v0/projects/{}/buckets/count",
            self.project_id
        ))?;
        Ok(client.get(full_url))
    }
}
