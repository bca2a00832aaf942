use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::EndpointError;
use super::types::{BucketInfo, BucketListItem, CreateBucketRequest};
use crate::bucket::{validate_bucket_name, Bucket};

pub const DEFAULT_MAX_BUCKETS: u64 = 100;
pub const DEFAULT_MAX_SEGMENT_SIZE: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherSuite {
    Null,
    #[default]
    AesGcm,
    Secretbox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedundancyAlgorithm {
    #[default]
    ReedSolomon,
}

/// Erasure coding parameters reported for every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedundancyScheme {
    pub algorithm: RedundancyAlgorithm,
    pub share_size: u32,
    pub required_shares: u16,
    pub repair_shares: u16,
    pub optimal_shares: u16,
    pub total_shares: u16,
}

impl Default for RedundancyScheme {
    fn default() -> Self {
        Self {
            algorithm: RedundancyAlgorithm::ReedSolomon,
            share_size: 256,
            required_shares: 29,
            repair_shares: 35,
            optimal_shares: 80,
            total_shares: 110,
        }
    }
}

impl RedundancyScheme {
    /// Size of one erasure-coded stripe of plaintext.
    pub fn stripe_size(&self) -> u64 {
        u64::from(self.share_size) * u64::from(self.required_shares)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParameters {
    pub cipher_suite: CipherSuite,
    pub block_size: u64,
}

/// System-wide bucket defaults. Changing these changes what every existing
/// bucket reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_max_buckets")]
    pub max_buckets: u64,
    #[serde(default = "default_max_segment_size")]
    pub max_segment_size: u64,
    #[serde(default)]
    pub redundancy: RedundancyScheme,
    #[serde(default)]
    pub path_cipher: CipherSuite,
}

fn default_max_buckets() -> u64 {
    DEFAULT_MAX_BUCKETS
}

fn default_max_segment_size() -> u64 {
    DEFAULT_MAX_SEGMENT_SIZE
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            max_buckets: DEFAULT_MAX_BUCKETS,
            max_segment_size: DEFAULT_MAX_SEGMENT_SIZE,
            redundancy: RedundancyScheme::default(),
            path_cipher: CipherSuite::default(),
        }
    }
}

impl EndpointConfig {
    pub fn encryption_parameters(&self) -> EncryptionParameters {
        EncryptionParameters {
            cipher_suite: self.path_cipher,
            block_size: self.redundancy.stripe_size(),
        }
    }
}

/// Converts between wire shapes and catalog records.
#[derive(Debug, Clone)]
pub struct ProtocolAdapter {
    config: EndpointConfig,
}

impl ProtocolAdapter {
    pub fn new(config: EndpointConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn validate_name(&self, name: &str) -> Result<(), EndpointError> {
        validate_bucket_name(name).map_err(|e| EndpointError::InvalidArgument(e.to_string()))
    }

    /// Build a new catalog record. Requested redundancy and encryption are
    /// ignored.
    pub fn bucket_from_request(
        &self,
        project_id: Uuid,
        user_agent: Option<&str>,
        req: &CreateBucketRequest,
    ) -> Result<Bucket, EndpointError> {
        self.validate_name(&req.name)?;

        let partner_id = match req.partner_id.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|e| {
                EndpointError::InvalidArgument(format!("invalid partner id: {}", e))
            })?),
        };

        if req.default_redundancy_scheme.is_some() || req.default_encryption_parameters.is_some() {
            tracing::debug!(bucket = %req.name, "discarding client-supplied bucket defaults");
        }

        Ok(Bucket {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            project_id,
            partner_id,
            user_agent: user_agent.filter(|ua| !ua.is_empty()).map(str::to_string),
            created_at: OffsetDateTime::now_utc(),
        })
    }

    /// `None` for an absent or nameless record.
    pub fn to_wire(&self, bucket: Option<&Bucket>) -> Option<BucketInfo> {
        let bucket = bucket.filter(|b| !b.name.is_empty())?;
        Some(BucketInfo {
            name: bucket.name.clone(),
            created_at: bucket.created_at,
            path_cipher: self.config.path_cipher,
            default_segment_size: self.config.max_segment_size,
            default_redundancy_scheme: self.config.redundancy,
            default_encryption_parameters: self.config.encryption_parameters(),
        })
    }

    pub fn to_list_item(&self, bucket: &Bucket) -> BucketListItem {
        BucketListItem {
            name: bucket.name.clone(),
            created_at: bucket.created_at,
        }
    }
}
