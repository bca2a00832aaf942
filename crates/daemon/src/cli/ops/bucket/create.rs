use common::endpoint::CreateBucketResponse;
use strata_daemon::http_server::api::client::ApiError;
use strata_daemon::http_server::api::v0::bucket::CreateRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for CreateRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: CreateBucketResponse = client.call(self.clone()).await?;

        Ok(match response.bucket {
            Some(bucket) => format!("Created bucket: {}", super::describe(&bucket)),
            None => format!("Created bucket: {}", self.name),
        })
    }
}
