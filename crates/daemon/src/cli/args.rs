pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Bucket lifecycle control plane")]
pub struct Args {
    /// Public API URL (defaults to the api_port in config, then 5001)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Admin API URL (defaults to the admin_port in config, then 5002)
    #[arg(long, global = true)]
    pub admin_remote: Option<Url>,

    /// Capability presented to the bucket API
    #[arg(long, global = true, env = "STRATA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to the strata config directory (defaults to ~/.strata)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
