use axum::routing::post;
use axum::Router;

use crate::ServiceState;

pub mod create;
pub mod delete;
pub mod get;
pub mod list;

// Re-export for convenience
pub use create::CreateRequest;
pub use delete::DeleteRequest;
pub use get::GetRequest;
pub use list::ListRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(create::handler))
        .route("/get", post(get::handler))
        .route("/delete", post(delete::handler))
        .route("/list", post(list::handler))
        .with_state(state)
}
