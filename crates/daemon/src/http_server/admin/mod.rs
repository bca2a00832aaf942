//! Operator-only routes: project provisioning, quota overrides, bucket
//! counts, and key issuance. Served on a loopback listener and never
//! authenticated with capabilities.

use axum::response::{IntoResponse, Response};
use axum::Json;
use axum::Router;
use http::StatusCode;
use uuid::Uuid;

use common::endpoint::EndpointError;

use crate::database::KeyQueryError;
use crate::http_server::api::error::{EndpointFailure, ErrorBody};
use crate::ServiceState;

pub mod v0;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/v0", v0::router(state.clone()))
        .with_state(state)
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("key error: {0}")]
    Key(#[from] KeyQueryError),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match self {
            AdminError::ProjectNotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    code: "not_found".to_string(),
                    message: format!("project not found: {}", id),
                }),
            )
                .into_response(),
            AdminError::Database(e) => {
                EndpointFailure(EndpointError::internal("admin database call", e)).into_response()
            }
            AdminError::Key(e) => {
                EndpointFailure(EndpointError::internal("issuing key", e)).into_response()
            }
            AdminError::Endpoint(e) => EndpointFailure(e).into_response(),
        }
    }
}
