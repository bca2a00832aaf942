mod memory;
mod provider;

pub use memory::{MemoryBucketCatalog, MemoryBucketCatalogError};
pub use provider::{BucketCatalog, CatalogError};
