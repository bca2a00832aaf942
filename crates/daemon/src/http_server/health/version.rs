use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;

use common::prelude::{build_info, BuildInfo};

use crate::state::APP_NAME;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub service: &'static str,
    #[serde(flatten)]
    pub build: BuildInfo,
}

pub async fn handler() -> Response {
    let body = VersionResponse {
        service: APP_NAME,
        build: build_info(),
    };
    (StatusCode::OK, Json(body)).into_response()
}
