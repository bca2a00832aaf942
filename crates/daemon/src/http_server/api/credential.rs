use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::header::{AUTHORIZATION, USER_AGENT};
use http::request::Parts;

use common::endpoint::{EndpointError, RequestHeader};

use super::error::EndpointFailure;

/// The caller's request header, taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct Credential(pub RequestHeader);

#[async_trait]
impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let reject = |message: &str| {
            EndpointFailure(EndpointError::InvalidCredential(message.to_string())).into_response()
        };

        let value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| reject("missing bearer token"))?
            .to_str()
            .map_err(|_| reject("malformed authorization header"))?;

        let token = match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
            _ => return Err(reject("expected a bearer token")),
        };
        if token.is_empty() {
            return Err(reject("missing bearer token"));
        }

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Credential(RequestHeader {
            api_key: token.to_string(),
            user_agent,
        }))
    }
}

#[cfg(test)]
mod tests {
    use http::{Request, StatusCode};

    use super::*;

    async fn extract(auth: Option<&str>) -> Result<Credential, Response> {
        let mut builder = Request::builder().uri("/").header(USER_AGENT, "tests/1.0");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Credential::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_bearer_token_is_extracted() {
        let Credential(header) = extract(Some("Bearer abc123")).await.unwrap();
        assert_eq!(header.api_key, "abc123");
        assert_eq!(header.user_agent.as_deref(), Some("tests/1.0"));

        let Credential(header) = extract(Some("bearer   xyz")).await.unwrap();
        assert_eq!(header.api_key, "xyz");
    }

    #[tokio::test]
    async fn test_missing_or_wrong_scheme_is_unauthorized() {
        for auth in [None, Some("Basic Zm9vOmJhcg=="), Some("Bearer "), Some("token")] {
            let response = extract(auth).await.unwrap_err();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{:?}", auth);
        }
    }
}
