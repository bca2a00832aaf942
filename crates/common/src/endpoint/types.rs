//! Wire shapes for the bucket endpoint.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::convert::{CipherSuite, EncryptionParameters, RedundancyScheme};
use crate::bucket::ListDirection;

/// Envelope carried by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl RequestHeader {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            user_agent: None,
        }
    }
}

/// A bucket as reported to callers. Redundancy and encryption always reflect
/// the current system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub path_cipher: CipherSuite,
    pub default_segment_size: u64,
    pub default_redundancy_scheme: RedundancyScheme,
    pub default_encryption_parameters: EncryptionParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketListItem {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBucketRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBucketResponse {
    pub bucket: Option<BucketInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketRequest {
    pub name: String,
    #[serde(default)]
    pub partner_id: Option<String>,
    /// Accepted for compatibility; never stored.
    #[serde(default)]
    pub default_redundancy_scheme: Option<RedundancyScheme>,
    /// Accepted for compatibility; never stored.
    #[serde(default)]
    pub default_encryption_parameters: Option<EncryptionParameters>,
}

impl CreateBucketRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partner_id: None,
            default_redundancy_scheme: None,
            default_encryption_parameters: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketResponse {
    pub bucket: Option<BucketInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBucketRequest {
    pub name: String,
    #[serde(default)]
    pub delete_all: bool,
}

/// `bucket` is only populated for callers allowed to read or list it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBucketResponse {
    pub bucket: Option<BucketInfo>,
    pub deleted_objects_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBucketsRequest {
    #[serde(default)]
    pub cursor: String,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub direction: ListDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBucketsResponse {
    pub items: Vec<BucketListItem>,
    pub more: bool,
}
