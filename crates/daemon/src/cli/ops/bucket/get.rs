use common::endpoint::GetBucketResponse;
use strata_daemon::http_server::api::client::ApiError;
use strata_daemon::http_server::api::v0::bucket::GetRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for GetRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: GetBucketResponse = client.call(self.clone()).await?;

        Ok(response
            .bucket
            .map(|bucket| super::describe(&bucket))
            .unwrap_or_else(|| format!("Bucket not found: {}", self.name)))
    }
}
