//! Capability credentials.
//!
//! A capability is a chained-MAC token in the macaroon style: it names the key it
//! was minted from (the `head`), carries an ordered list of caveats that only ever
//! narrow what it grants, and ends in a `tail` that commits to all of them. Anyone
//! holding a capability can attenuate it further; only the key secret can verify it.

mod allowed;
mod caveat;
mod token;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use allowed::AllowedBuckets;
pub use caveat::{Caveat, Denial};
pub use token::{Capability, SECRET_LEN};

/// Operations a capability can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Read,
    Write,
    List,
    Delete,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::List => "list",
            Operation::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// A single requested action, checked against every caveat of a capability.
///
/// The timestamp is chosen by the caller so that all checks made on behalf of
/// one request agree on "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub op: Operation,
    /// Target bucket; empty when the action spans the whole project (listing).
    pub bucket: String,
    pub time: OffsetDateTime,
}

impl Action {
    pub fn new(op: Operation, bucket: impl Into<String>, time: OffsetDateTime) -> Self {
        Self {
            op,
            bucket: bucket.into(),
            time,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("malformed capability encoding: {0}")]
    Encoding(String),
    #[error("malformed caveat: {0}")]
    Caveat(String),
    #[error("action denied: {0}")]
    Denied(Denial),
}
