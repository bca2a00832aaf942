use uuid::Uuid;

use super::error::EndpointError;
use super::types::RequestHeader;
use crate::capability::{Action, AllowedBuckets, Capability, CapabilityError};
use crate::keys::{KeyInfo, KeyResolver};

/// Outcome of an optional permission check. A denial here is information,
/// not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGrant {
    pub granted: bool,
}

/// A verified credential: who is calling and what else it may do.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub key: KeyInfo,
    pub capability: Capability,
    /// One entry per optional action, in the order they were requested.
    pub grants: Vec<PermissionGrant>,
}

impl Authorization {
    pub fn project_id(&self) -> Uuid {
        self.key.project_id
    }

    pub fn granted(&self, index: usize) -> bool {
        self.grants.get(index).map(|g| g.granted).unwrap_or(false)
    }

    /// Buckets the credential may see for `action`.
    pub fn allowed_buckets(&self, action: &Action) -> Result<AllowedBuckets, EndpointError> {
        self.capability
            .allowed_buckets(action)
            .map_err(denial_to_error)
    }
}

/// Checks presented capabilities against requested actions.
///
/// Holds no state between calls; every request is verified from scratch.
#[derive(Debug, Clone)]
pub struct AuthorizationGate<K> {
    keys: K,
}

impl<K: KeyResolver> AuthorizationGate<K> {
    pub fn new(keys: K) -> Self {
        Self { keys }
    }

    /// Verify the credential in `header` and check `action` against it.
    ///
    /// Each of `optional` is checked too, but only reported through
    /// [`Authorization::grants`]. All actions should share one timestamp.
    pub async fn authorize(
        &self,
        header: &RequestHeader,
        action: &Action,
        optional: &[Action],
    ) -> Result<Authorization, EndpointError> {
        let capability = Capability::parse(&header.api_key).map_err(|e| {
            tracing::debug!(error = %e, "rejecting malformed credential");
            EndpointError::InvalidCredential("invalid API credentials".to_string())
        })?;

        let key = self
            .keys
            .get_key_by_head(capability.head())
            .await
            .map_err(|e| EndpointError::internal("resolving API key", e))?
            .ok_or_else(|| EndpointError::InvalidCredential("unknown API key".to_string()))?;

        if !capability.validate(&key.secret) {
            tracing::debug!(key_id = %key.id, "credential failed signature check");
            return Err(EndpointError::InvalidCredential(
                "invalid API credentials".to_string(),
            ));
        }

        capability.check(action).map_err(|e| {
            tracing::debug!(key_id = %key.id, op = %action.op, bucket = %action.bucket, error = %e, "action denied");
            denial_to_error(e)
        })?;

        let grants = optional
            .iter()
            .map(|action| PermissionGrant {
                granted: capability.check(action).is_ok(),
            })
            .collect();

        Ok(Authorization {
            key,
            capability,
            grants,
        })
    }
}

fn denial_to_error(err: CapabilityError) -> EndpointError {
    match err {
        CapabilityError::Denied(denial) if denial.is_validity() => {
            EndpointError::InvalidCredential(denial.to_string())
        }
        CapabilityError::Denied(denial) => EndpointError::Forbidden(denial.to_string()),
        e => EndpointError::InvalidCredential(e.to_string()),
    }
}
