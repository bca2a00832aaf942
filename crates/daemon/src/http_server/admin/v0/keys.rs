use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::admin::AdminError;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct IssueKeyRequest {
    /// Project the key belongs to
    #[arg(long)]
    pub project_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueKeyResponse {
    pub key_id: Uuid,
    pub project_id: Uuid,
    /// Unrestricted capability for the project; shown once
    pub token: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AdminError> {
    if state.database().get_project(id).await?.is_none() {
        return Err(AdminError::ProjectNotFound(id));
    }
    let (info, root) = state.database().issue_key(id).await?;
    tracing::info!(project_id = %id, key_id = %info.id, "issued API key");
    Ok((
        http::StatusCode::CREATED,
        Json(IssueKeyResponse {
            key_id: info.id,
            project_id: id,
            token: root.serialize(),
        }),
    )
        .into_response())
}

impl ApiRequest for IssueKeyRequest {
    type Response = IssueKeyResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join(&format!("/admin/v0/projects/{}/keys", self.project_id))?;
        Ok(client.post(full_url))
    }
}
