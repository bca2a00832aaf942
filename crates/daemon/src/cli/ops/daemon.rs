use clap::Args;

use strata_daemon::state::{AppState, StateError};
use strata_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Override admin server port (default from config)
    #[arg(long)]
    pub admin_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.strata)
        let state = AppState::load(ctx.config_path.clone())?;

        let mut config = ServiceConfig::from_app_config(&state.config, Some(state.db_path));
        // Use ports from flags or config
        if let Some(port) = self.api_port {
            config.api_listen_addr.set_port(port);
        }
        if let Some(port) = self.admin_port {
            config.admin_listen_addr.set_port(port);
        }
        config.log_dir = self.log_dir.clone();

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
