use clap::Args;

use strata_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Public API port
    #[arg(long, default_value_t = 5001)]
    pub api_port: u16,

    /// Admin API port (always bound to localhost)
    #[arg(long, default_value_t = 5002)]
    pub admin_port: u16,

    /// Default bucket ceiling per project
    #[arg(long)]
    pub max_buckets: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_port: self.api_port,
            admin_port: self.admin_port,
            max_buckets: self.max_buckets.unwrap_or(defaults.max_buckets),
            ..defaults
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized strata directory at: {}\n\
             - Database: {}\n\
             - Config: {}\n\
             - API port: {}\n\
             - Admin port: {}\n\
             - Default max buckets: {}",
            state.strata_dir.display(),
            state.db_path.display(),
            state.config_path.display(),
            state.config.api_port,
            state.config.admin_port,
            state.config.max_buckets,
        );

        Ok(output)
    }
}
