//! HTTP rendering of endpoint failures.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use common::endpoint::EndpointError;

/// JSON body of every failed API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

pub fn status_code(err: &EndpointError) -> StatusCode {
    match err {
        EndpointError::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
        EndpointError::Forbidden(_) => StatusCode::FORBIDDEN,
        EndpointError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        EndpointError::NotFound(_) => StatusCode::NOT_FOUND,
        EndpointError::AlreadyExists(_) => StatusCode::CONFLICT,
        EndpointError::ResourceExhausted(_) => StatusCode::TOO_MANY_REQUESTS,
        EndpointError::FailedPrecondition(_) => StatusCode::PRECONDITION_FAILED,
        EndpointError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// An endpoint error on its way out of a handler
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct EndpointFailure(#[from] pub EndpointError);

/// A JSON request body that fails with the API's own error body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(EndpointFailure))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for EndpointFailure {
    fn from(rejection: JsonRejection) -> Self {
        EndpointFailure(EndpointError::InvalidArgument(rejection.body_text()))
    }
}

impl IntoResponse for EndpointFailure {
    fn into_response(self) -> Response {
        let status = status_code(&self.0);
        tracing::debug!(%status, "request failed: {}", self.0);
        let body = ErrorBody {
            code: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_maps_to_a_distinct_status() {
        let errors = [
            EndpointError::InvalidCredential(String::new()),
            EndpointError::Forbidden(String::new()),
            EndpointError::InvalidArgument(String::new()),
            EndpointError::NotFound(String::new()),
            EndpointError::AlreadyExists(String::new()),
            EndpointError::ResourceExhausted(String::new()),
            EndpointError::FailedPrecondition(String::new()),
            EndpointError::Internal,
        ];
        let statuses: std::collections::HashSet<_> = errors.iter().map(status_code).collect();
        assert_eq!(statuses.len(), errors.len());
    }

    #[tokio::test]
    async fn test_bad_json_is_invalid_argument() {
        let request = http::Request::builder()
            .method(http::Method::POST)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("not json"))
            .unwrap();
        let rejection = ApiJson::<ErrorBody>::from_request(request, &())
            .await
            .unwrap_err();
        assert!(matches!(rejection.0, EndpointError::InvalidArgument(_)));
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_body_is_generic() {
        let response = EndpointFailure(EndpointError::Internal).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
