//! API key records and their lookup by capability head.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::capability::{Capability, SECRET_LEN};

/// The server-side half of an API key. Every capability derived from the key
/// shares its head and verifies against its secret.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub id: Uuid,
    pub project_id: Uuid,
    pub head: Vec<u8>,
    pub secret: [u8; SECRET_LEN],
    pub created_at: OffsetDateTime,
}

impl KeyInfo {
    /// Generate a key for a project along with its unrestricted root capability.
    pub fn generate(project_id: Uuid) -> (Self, Capability) {
        let secret = Capability::generate_secret();
        let root = Capability::generate(&secret);
        let info = Self {
            id: Uuid::new_v4(),
            project_id,
            head: root.head().to_vec(),
            secret,
            created_at: OffsetDateTime::now_utc(),
        };
        (info, root)
    }
}

impl Debug for KeyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyInfo")
            .field("id", &self.id)
            .field("project_id", &self.project_id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Resolves the head of a presented capability to the key that minted it.
#[async_trait]
pub trait KeyResolver: Send + Sync + std::fmt::Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    async fn get_key_by_head(&self, head: &[u8]) -> Result<Option<KeyInfo>, Self::Error>;
}

/// In-memory key store
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    keys: Arc<RwLock<HashMap<Vec<u8>, KeyInfo>>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryKeyStoreError {
    #[error("memory key store error: {0}")]
    Internal(String),
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate and store a key for `project_id`, returning its root capability.
    pub fn issue(&self, project_id: Uuid) -> Result<Capability, MemoryKeyStoreError> {
        let (info, root) = KeyInfo::generate(project_id);
        self.insert(info)?;
        Ok(root)
    }

    pub fn insert(&self, info: KeyInfo) -> Result<(), MemoryKeyStoreError> {
        let mut keys = self
            .keys
            .write()
            .map_err(|e| MemoryKeyStoreError::Internal(e.to_string()))?;
        keys.insert(info.head.clone(), info);
        Ok(())
    }
}

#[async_trait]
impl KeyResolver for MemoryKeyStore {
    type Error = MemoryKeyStoreError;

    async fn get_key_by_head(&self, head: &[u8]) -> Result<Option<KeyInfo>, Self::Error> {
        let keys = self
            .keys
            .read()
            .map_err(|e| MemoryKeyStoreError::Internal(e.to_string()))?;
        Ok(keys.get(head).cloned())
    }
}
