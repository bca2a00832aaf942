use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{Action, AllowedBuckets, CapabilityError, Caveat};

/// Length of a key secret and of every link in the MAC chain.
pub const SECRET_LEN: usize = 32;
const HEAD_LEN: usize = 32;

/// An attenuable capability credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    head: Vec<u8>,
    caveats: Vec<Vec<u8>>,
    tail: [u8; SECRET_LEN],
}

impl Capability {
    /// Mint a root capability for `head`, signed by the key secret.
    pub fn new(head: Vec<u8>, secret: &[u8; SECRET_LEN]) -> Self {
        let tail = *blake3::keyed_hash(secret, &head).as_bytes();
        Self {
            head,
            caveats: Vec::new(),
            tail,
        }
    }

    /// Mint a root capability with a fresh random head.
    pub fn generate(secret: &[u8; SECRET_LEN]) -> Self {
        let head: [u8; HEAD_LEN] = rand::random();
        Self::new(head.to_vec(), secret)
    }

    pub fn generate_secret() -> [u8; SECRET_LEN] {
        rand::random()
    }

    pub fn head(&self) -> &[u8] {
        &self.head
    }

    /// Append a caveat, producing a strictly weaker capability.
    pub fn restrict(&self, caveat: &Caveat) -> Result<Self, CapabilityError> {
        let bytes = caveat.to_bytes()?;
        let tail = *blake3::keyed_hash(&self.tail, &bytes).as_bytes();
        let mut caveats = self.caveats.clone();
        caveats.push(bytes);
        Ok(Self {
            head: self.head.clone(),
            caveats,
            tail,
        })
    }

    /// Recompute the MAC chain from the key secret and compare tails.
    pub fn validate(&self, secret: &[u8; SECRET_LEN]) -> bool {
        let mut tail = blake3::keyed_hash(secret, &self.head);
        for caveat in &self.caveats {
            tail = blake3::keyed_hash(tail.as_bytes(), caveat);
        }
        // blake3::Hash equality is constant time
        tail == blake3::Hash::from(self.tail)
    }

    pub fn caveats(&self) -> Result<Vec<Caveat>, CapabilityError> {
        self.caveats.iter().map(|c| Caveat::from_bytes(c)).collect()
    }

    /// Check an action against every caveat. Does not verify the signature.
    pub fn check(&self, action: &Action) -> Result<(), CapabilityError> {
        for caveat in self.caveats()? {
            caveat.allows(action).map_err(CapabilityError::Denied)?;
        }
        Ok(())
    }

    /// Buckets visible to `action`: the intersection of every caveat's allow-list.
    pub fn allowed_buckets(&self, action: &Action) -> Result<AllowedBuckets, CapabilityError> {
        let mut allowed = AllowedBuckets::all();
        for caveat in self.caveats()? {
            caveat.allows(action).map_err(CapabilityError::Denied)?;
            allowed.restrict(&caveat.allowed_buckets);
        }
        Ok(allowed)
    }

    pub fn serialize(&self) -> String {
        // serializing plain byte vectors cannot fail
        let bytes = bincode::serialize(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn parse(encoded: &str) -> Result<Self, CapabilityError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|e| CapabilityError::Encoding(e.to_string()))?;
        let capability: Capability = bincode::deserialize(&bytes)
            .map_err(|e| CapabilityError::Encoding(e.to_string()))?;
        if capability.head.is_empty() {
            return Err(CapabilityError::Encoding("empty head".to_string()));
        }
        Ok(capability)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.head.iter().map(|b| format!("{:02x}", b)).collect();
        f.debug_struct("Capability")
            .field("head", &head)
            .field("caveats", &self.caveats.len())
            .finish_non_exhaustive()
    }
}
