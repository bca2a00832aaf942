use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::{Action, CapabilityError, Operation};

/// A restriction appended to a capability.
///
/// Every flag and bound narrows the grant; an all-default caveat restricts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caveat {
    pub disallow_reads: bool,
    pub disallow_writes: bool,
    pub disallow_lists: bool,
    pub disallow_deletes: bool,
    /// Buckets this caveat permits. Empty means any bucket.
    pub allowed_buckets: Vec<String>,
    /// Unix seconds before which the caveat rejects every action.
    pub not_before: Option<i64>,
    /// Unix seconds after which the caveat rejects every action.
    pub not_after: Option<i64>,
}

/// Why a caveat rejected an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    NotYetValid,
    Expired,
    OperationDisallowed(Operation),
    BucketDisallowed(String),
}

impl Denial {
    /// Time-window denials mean the credential itself is unusable right now,
    /// as opposed to lacking a particular grant.
    pub fn is_validity(&self) -> bool {
        matches!(self, Denial::NotYetValid | Denial::Expired)
    }
}

impl Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::NotYetValid => write!(f, "credential is not valid yet"),
            Denial::Expired => write!(f, "credential has expired"),
            Denial::OperationDisallowed(op) => write!(f, "{} operations are not permitted", op),
            Denial::BucketDisallowed(bucket) => {
                write!(f, "bucket '{}' is not permitted", bucket)
            }
        }
    }
}

impl Caveat {
    pub fn allows(&self, action: &Action) -> Result<(), Denial> {
        let now = action.time.unix_timestamp();
        if let Some(not_before) = self.not_before {
            if now < not_before {
                return Err(Denial::NotYetValid);
            }
        }
        if let Some(not_after) = self.not_after {
            if now > not_after {
                return Err(Denial::Expired);
            }
        }

        let disallowed = match action.op {
            Operation::Read => self.disallow_reads,
            Operation::Write => self.disallow_writes,
            Operation::List => self.disallow_lists,
            Operation::Delete => self.disallow_deletes,
        };
        if disallowed {
            return Err(Denial::OperationDisallowed(action.op));
        }

        if !self.allowed_buckets.is_empty() {
            if action.bucket.is_empty() {
                // project-wide listing; the allow-list is applied to the results instead
                return match action.op {
                    Operation::Read | Operation::List => Ok(()),
                    op => Err(Denial::OperationDisallowed(op)),
                };
            }
            if !self.allowed_buckets.iter().any(|b| b == &action.bucket) {
                return Err(Denial::BucketDisallowed(action.bucket.clone()));
            }
        }

        Ok(())
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, CapabilityError> {
        bincode::serialize(self).map_err(|e| CapabilityError::Caveat(e.to_string()))
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self, CapabilityError> {
        bincode::deserialize(bytes).map_err(|e| CapabilityError::Caveat(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;

    fn action(op: Operation, bucket: &str) -> Action {
        Action::new(op, bucket, OffsetDateTime::from_unix_timestamp(1_000).unwrap())
    }

    #[test]
    fn test_default_caveat_allows_everything() {
        let caveat = Caveat::default();
        for op in [
            Operation::Read,
            Operation::Write,
            Operation::List,
            Operation::Delete,
        ] {
            assert!(caveat.allows(&action(op, "photos")).is_ok());
        }
    }

    #[test]
    fn test_disallowed_operation() {
        let caveat = Caveat {
            disallow_deletes: true,
            ..Default::default()
        };
        assert_eq!(
            caveat.allows(&action(Operation::Delete, "photos")),
            Err(Denial::OperationDisallowed(Operation::Delete))
        );
        assert!(caveat.allows(&action(Operation::Read, "photos")).is_ok());
    }

    #[test]
    fn test_time_window() {
        let caveat = Caveat {
            not_before: Some(500),
            not_after: Some(900),
            ..Default::default()
        };
        let denial = caveat.allows(&action(Operation::Read, "photos")).unwrap_err();
        assert_eq!(denial, Denial::Expired);
        assert!(denial.is_validity());

        let early = Action::new(
            Operation::Read,
            "photos",
            OffsetDateTime::from_unix_timestamp(100).unwrap(),
        );
        assert_eq!(caveat.allows(&early), Err(Denial::NotYetValid));
    }

    #[test]
    fn test_bucket_restriction() {
        let caveat = Caveat {
            allowed_buckets: vec!["photos".to_string()],
            ..Default::default()
        };
        assert!(caveat.allows(&action(Operation::Write, "photos")).is_ok());
        assert_eq!(
            caveat.allows(&action(Operation::Write, "videos")),
            Err(Denial::BucketDisallowed("videos".to_string()))
        );
        // project-wide listing passes, other project-wide actions do not
        assert!(caveat.allows(&action(Operation::List, "")).is_ok());
        assert!(caveat.allows(&action(Operation::Write, "")).is_err());
    }
}
