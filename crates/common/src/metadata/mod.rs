mod memory;
mod provider;

pub use memory::{MemoryObjectMetadata, MemoryObjectMetadataError};
pub use provider::{DeletedSegmentInfo, ObjectMetadata, OnDeletedSegments, PieceLocation};
