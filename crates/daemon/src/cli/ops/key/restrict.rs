use clap::Args;
use time::OffsetDateTime;

use common::capability::{Capability, CapabilityError, Caveat};

/// Derive a narrower capability from the one given by `--token`
#[derive(Args, Debug, Clone, Default)]
pub struct Restrict {
    #[arg(long)]
    pub disallow_reads: bool,

    #[arg(long)]
    pub disallow_writes: bool,

    #[arg(long)]
    pub disallow_lists: bool,

    #[arg(long)]
    pub disallow_deletes: bool,

    /// Restrict to these buckets (repeatable)
    #[arg(long = "bucket")]
    pub buckets: Vec<String>,

    /// Valid from this many seconds from now (negative for the past)
    #[arg(long, allow_negative_numbers = true)]
    pub not_before: Option<i64>,

    /// Valid until this many seconds from now
    #[arg(long, allow_negative_numbers = true)]
    pub not_after: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum RestrictError {
    #[error("no capability to restrict; pass --token or set STRATA_TOKEN")]
    MissingToken,
    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),
}

impl Restrict {
    fn caveat(&self, now: OffsetDateTime) -> Caveat {
        let now = now.unix_timestamp();
        Caveat {
            disallow_reads: self.disallow_reads,
            disallow_writes: self.disallow_writes,
            disallow_lists: self.disallow_lists,
            disallow_deletes: self.disallow_deletes,
            allowed_buckets: self.buckets.clone(),
            not_before: self.not_before.map(|s| now.saturating_add(s)),
            not_after: self.not_after.map(|s| now.saturating_add(s)),
        }
    }

    pub fn apply(&self, token: &str, now: OffsetDateTime) -> Result<String, RestrictError> {
        let restricted = Capability::parse(token)?.restrict(&self.caveat(now))?;
        Ok(restricted.serialize())
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Restrict {
    type Error = RestrictError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let token = ctx.token.as_deref().ok_or(RestrictError::MissingToken)?;
        self.apply(token, OffsetDateTime::now_utc())
    }
}
