use axum::routing::{get, post, put};
use axum::Router;

pub mod keys;
pub mod projects;

pub use keys::IssueKeyRequest;
pub use projects::{CountRequest, CreateProjectRequest, SetLimitRequest};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/projects", post(projects::create_handler))
        .route("/projects/:id/limits", put(projects::limit_handler))
        .route("/projects/:id/buckets/count", get(projects::count_handler))
        .route("/projects/:id/keys", post(keys::handler))
        .with_state(state)
}
