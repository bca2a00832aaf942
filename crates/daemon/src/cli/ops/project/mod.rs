use clap::{Args, Subcommand};

use strata_daemon::http_server::admin::v0::{
    CountRequest, CreateProjectRequest, IssueKeyRequest, SetLimitRequest,
};
use strata_daemon::http_server::api::client::ApiError;

use crate::cli::op::{Op, OpContext};

crate::command_enum! {
    (Create, CreateProjectRequest),
    (Limit, SetLimitRequest),
    (Count, CountRequest),
    (Key, IssueKeyRequest),
}

pub type ProjectCommand = Command;

/// Project administration through the admin API
#[derive(Args, Debug, Clone)]
pub struct Project {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[async_trait::async_trait]
impl Op for Project {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

fn limit_label(max_buckets: Option<u64>) -> String {
    max_buckets
        .map(|m| m.to_string())
        .unwrap_or_else(|| "system default".to_string())
}

#[async_trait::async_trait]
impl Op for CreateProjectRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let mut admin = ctx.admin.clone();
        let project = admin.call(self.clone()).await?;
        Ok(format!(
            "Created project: {} (max buckets: {})",
            project.id,
            limit_label(project.max_buckets)
        ))
    }
}

#[async_trait::async_trait]
impl Op for SetLimitRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let mut admin = ctx.admin.clone();
        let project = admin.call(self.clone()).await?;
        Ok(format!(
            "Project {} max buckets: {}",
            project.id,
            limit_label(project.max_buckets)
        ))
    }
}

#[async_trait::async_trait]
impl Op for CountRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let mut admin = ctx.admin.clone();
        let response = admin.call(self.clone()).await?;
        Ok(format!(
            "Project {}: {} of {} buckets",
            response.project_id, response.count, response.max_buckets
        ))
    }
}

#[async_trait::async_trait]
impl Op for IssueKeyRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let mut admin = ctx.admin.clone();
        let response = admin.call(self.clone()).await?;
        Ok(format!(
            "Issued key {} for project {}\n{}",
            response.key_id, response.project_id, response.token
        ))
    }
}
