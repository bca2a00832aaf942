mod name;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub use name::{validate_bucket_name, BucketNameError, MAX_NAME_LEN, MIN_NAME_LEN};

/// Largest page a single list call will return.
pub const MAX_LIST_LIMIT: usize = 1000;

/// A catalog record. Buckets carry no redundancy or encryption settings of
/// their own; those are derived from system configuration whenever a bucket
/// is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub partner_id: Option<Uuid>,
    /// Client that created the bucket, kept for attribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Where a bucket's objects live in the object metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketLocation {
    pub project_id: Uuid,
    pub bucket_name: String,
}

impl BucketLocation {
    pub fn new(project_id: Uuid, bucket_name: impl Into<String>) -> Self {
        Self {
            project_id,
            bucket_name: bucket_name.into(),
        }
    }
}

impl std::fmt::Display for BucketLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.project_id, self.bucket_name)
    }
}

/// Traversal order for bucket listings, relative to an exclusive cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListDirection {
    /// Names strictly greater than the cursor, ascending.
    #[default]
    Forward,
    /// Names strictly less than the cursor, descending. An empty cursor
    /// starts from the last name.
    Backward,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub cursor: String,
    pub limit: usize,
    pub direction: ListDirection,
}

impl ListOptions {
    /// Zero or oversized limits fall back to the maximum page size.
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 || self.limit > MAX_LIST_LIMIT {
            MAX_LIST_LIMIT
        } else {
            self.limit
        }
    }

    /// Whether `name` lies past the cursor in the requested direction.
    pub fn is_after_cursor(&self, name: &str) -> bool {
        if self.cursor.is_empty() {
            return true;
        }
        match self.direction {
            ListDirection::Forward => name > self.cursor.as_str(),
            ListDirection::Backward => name < self.cursor.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketList {
    pub items: Vec<Bucket>,
    pub more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        let mut opts = ListOptions::default();
        assert_eq!(opts.effective_limit(), MAX_LIST_LIMIT);
        opts.limit = 10;
        assert_eq!(opts.effective_limit(), 10);
        opts.limit = MAX_LIST_LIMIT + 1;
        assert_eq!(opts.effective_limit(), MAX_LIST_LIMIT);
    }

    #[test]
    fn test_cursor_is_exclusive() {
        let forward = ListOptions {
            cursor: "b".to_string(),
            limit: 0,
            direction: ListDirection::Forward,
        };
        assert!(!forward.is_after_cursor("b"));
        assert!(forward.is_after_cursor("c"));
        assert!(!forward.is_after_cursor("a"));

        let backward = ListOptions {
            direction: ListDirection::Backward,
            ..forward
        };
        assert!(!backward.is_after_cursor("b"));
        assert!(backward.is_after_cursor("a"));
    }
}
