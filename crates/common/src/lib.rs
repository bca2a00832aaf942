/**
 * Bucket records, listing options and the
 *  bucket name grammar.
 */
pub mod bucket;
/**
 * Capability credentials.
 *  - Chained-MAC tokens with attenuating caveats
 *  - Action checks and allowed-bucket sets
 */
pub mod capability;
/**
 * The authoritative store of bucket records,
 *  plus an in-memory implementation.
 */
pub mod catalog;
/**
 * The bucket endpoint: authorization, quota,
 *  the emptiness protocol and wire conversion.
 */
pub mod endpoint;
pub mod keys;
/**
 * Object metadata, as far as emptying a
 *  bucket needs it.
 */
pub mod metadata;
pub mod pieces;
pub mod projects;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::bucket::{Bucket, BucketLocation, ListDirection, ListOptions};
    pub use crate::capability::{Action, AllowedBuckets, Capability, Caveat, Operation};
    pub use crate::catalog::{BucketCatalog, CatalogError, MemoryBucketCatalog};
    pub use crate::endpoint::{Endpoint, EndpointConfig, EndpointError, RequestHeader};
    pub use crate::keys::{KeyInfo, KeyResolver, MemoryKeyStore};
    pub use crate::metadata::{MemoryObjectMetadata, ObjectMetadata};
    pub use crate::pieces::{PieceDeletionQueue, PieceQueueConfig};
    pub use crate::projects::{MemoryProjectSettings, ProjectSettings};
    pub use crate::version::{build_info, BuildInfo};
}
