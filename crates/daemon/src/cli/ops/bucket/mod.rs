use clap::{Args, Subcommand};

pub mod create;
pub mod delete;
pub mod get;
pub mod list;

use common::endpoint::BucketInfo;
use strata_daemon::http_server::api::v0::bucket::{
    CreateRequest, DeleteRequest, GetRequest, ListRequest,
};

use crate::cli::op::Op;

crate::command_enum! {
    (Create, CreateRequest),
    (Get, GetRequest),
    (Delete, DeleteRequest),
    (List, ListRequest),
}

// Rename the generated Command to BucketCommand for clarity
pub type BucketCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Bucket {
    #[command(subcommand)]
    pub command: BucketCommand,
}

#[async_trait::async_trait]
impl Op for Bucket {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

fn describe(bucket: &BucketInfo) -> String {
    let rs = &bucket.default_redundancy_scheme;
    format!(
        "{} (created {})\n  segment size: {} bytes\n  redundancy: {:?} {}/{}/{}/{} @ {} bytes\n  path cipher: {:?}",
        bucket.name,
        bucket.created_at,
        bucket.default_segment_size,
        rs.algorithm,
        rs.required_shares,
        rs.repair_shares,
        rs.optimal_shares,
        rs.total_shares,
        rs.share_size,
        bucket.path_cipher,
    )
}
