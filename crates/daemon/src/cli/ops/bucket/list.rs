use common::endpoint::ListBucketsResponse;
use strata_daemon::http_server::api::client::ApiError;
use strata_daemon::http_server::api::v0::bucket::ListRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for ListRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: ListBucketsResponse = client.call(self.clone()).await?;

        if response.items.is_empty() {
            return Ok("No buckets found".to_string());
        }

        let mut lines: Vec<String> = response
            .items
            .iter()
            .map(|b| format!("{} (created {})", b.name, b.created_at))
            .collect();
        if response.more {
            if let Some(last) = response.items.last() {
                lines.push(format!("... more results, continue with --cursor {}", last.name));
            }
        }
        Ok(lines.join("\n"))
    }
}
