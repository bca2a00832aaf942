use uuid::Uuid;

use super::error::EndpointError;
use crate::catalog::BucketCatalog;
use crate::projects::ProjectSettings;

/// Per-project bucket ceilings.
///
/// The check runs before insertion and is not combined with it, so heavy
/// concurrent creation in one project may overshoot the ceiling slightly.
#[derive(Debug, Clone)]
pub struct QuotaPolicy<C, P> {
    catalog: C,
    projects: P,
    default_max_buckets: u64,
}

impl<C: BucketCatalog, P: ProjectSettings> QuotaPolicy<C, P> {
    pub fn new(catalog: C, projects: P, default_max_buckets: u64) -> Self {
        Self {
            catalog,
            projects,
            default_max_buckets,
        }
    }

    /// The project's override, or the system default when none is set.
    pub async fn max_buckets(&self, project_id: Uuid) -> Result<u64, EndpointError> {
        let limit = self
            .projects
            .max_buckets(project_id)
            .await
            .map_err(|e| EndpointError::internal("reading project bucket limit", e))?;
        Ok(limit.unwrap_or(self.default_max_buckets))
    }

    pub async fn check_quota(&self, project_id: Uuid) -> Result<(), EndpointError> {
        let max = self.max_buckets(project_id).await?;
        let count = self
            .catalog
            .count_buckets(project_id)
            .await
            .map_err(|e| EndpointError::from_catalog("counting buckets", e))?;

        if count >= max {
            tracing::info!(%project_id, count, max, "bucket quota reached");
            return Err(EndpointError::ResourceExhausted(format!(
                "number of allocated buckets ({}) exceeded",
                max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::bucket::Bucket;
    use crate::catalog::MemoryBucketCatalog;
    use crate::projects::MemoryProjectSettings;

    async fn add_bucket(catalog: &MemoryBucketCatalog, project_id: Uuid, name: &str) {
        catalog
            .create_bucket(Bucket {
                id: Uuid::new_v4(),
                name: name.to_string(),
                project_id,
                partner_id: None,
                user_agent: None,
                created_at: OffsetDateTime::now_utc(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_override_falls_back_to_default() {
        let projects = MemoryProjectSettings::new();
        let policy = QuotaPolicy::new(MemoryBucketCatalog::new(), projects.clone(), 100);
        let project = Uuid::new_v4();

        assert_eq!(policy.max_buckets(project).await.unwrap(), 100);
        projects.set_max_buckets(project, Some(5)).unwrap();
        assert_eq!(policy.max_buckets(project).await.unwrap(), 5);
        projects.set_max_buckets(project, None).unwrap();
        assert_eq!(policy.max_buckets(project).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_limit_is_a_ceiling_on_existing_count() {
        let catalog = MemoryBucketCatalog::new();
        let projects = MemoryProjectSettings::new();
        let policy = QuotaPolicy::new(catalog.clone(), projects.clone(), 100);
        let project = Uuid::new_v4();
        projects.set_max_buckets(project, Some(2)).unwrap();

        add_bucket(&catalog, project, "alpha").await;
        assert!(policy.check_quota(project).await.is_ok());

        add_bucket(&catalog, project, "bravo").await;
        let err = policy.check_quota(project).await.unwrap_err();
        assert_eq!(
            err,
            EndpointError::ResourceExhausted(
                "number of allocated buckets (2) exceeded".to_string()
            )
        );

        // other projects are unaffected
        assert!(policy.check_quota(Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_zero_limit_blocks_everything() {
        let projects = MemoryProjectSettings::new();
        let policy = QuotaPolicy::new(MemoryBucketCatalog::new(), projects.clone(), 100);
        let project = Uuid::new_v4();
        projects.set_max_buckets(project, Some(0)).unwrap();
        assert!(matches!(
            policy.check_quota(project).await,
            Err(EndpointError::ResourceExhausted(_))
        ));
    }
}
