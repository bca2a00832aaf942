use common::endpoint::DeleteBucketResponse;
use strata_daemon::http_server::api::client::ApiError;
use strata_daemon::http_server::api::v0::bucket::DeleteRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for DeleteRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: DeleteBucketResponse = client.call(self.clone()).await?;

        // the server withholds the bucket from callers that cannot read or list it
        Ok(match response.bucket {
            Some(bucket) => format!(
                "Deleted bucket: {} ({} objects removed)",
                bucket.name, response.deleted_objects_count
            ),
            None => format!("Delete request for {} accepted", self.name),
        })
    }
}
