//! Per-project settings consulted by bucket quota checks.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ProjectSettings: Send + Sync + std::fmt::Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// The project's bucket-count override, if one is set.
    async fn max_buckets(&self, project_id: Uuid) -> Result<Option<u64>, Self::Error>;
}

/// In-memory project settings
#[derive(Debug, Clone, Default)]
pub struct MemoryProjectSettings {
    max_buckets: Arc<RwLock<HashMap<Uuid, u64>>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryProjectSettingsError {
    #[error("memory project settings error: {0}")]
    Internal(String),
}

impl MemoryProjectSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_buckets(
        &self,
        project_id: Uuid,
        max_buckets: Option<u64>,
    ) -> Result<(), MemoryProjectSettingsError> {
        let mut inner = self
            .max_buckets
            .write()
            .map_err(|e| MemoryProjectSettingsError::Internal(e.to_string()))?;
        match max_buckets {
            Some(max) => inner.insert(project_id, max),
            None => inner.remove(&project_id),
        };
        Ok(())
    }
}

#[async_trait]
impl ProjectSettings for MemoryProjectSettings {
    type Error = MemoryProjectSettingsError;

    async fn max_buckets(&self, project_id: Uuid) -> Result<Option<u64>, Self::Error> {
        let inner = self
            .max_buckets
            .read()
            .map_err(|e| MemoryProjectSettingsError::Internal(e.to_string()))?;
        Ok(inner.get(&project_id).copied())
    }
}
