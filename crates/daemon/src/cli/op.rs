use std::error::Error;
use std::path::PathBuf;

use url::Url;

use strata_daemon::http_server::api::client::{ApiClient, ApiError};
use strata_daemon::state::AppState;

const DEFAULT_API_PORT: u16 = 5001;
const DEFAULT_ADMIN_PORT: u16 = 5002;

/// Resolve the remote URL for the API client.
///
/// Priority: explicit `--remote` flag > config file `api_port` > 5001.
pub fn resolve_remote(explicit: Option<Url>, config_path: Option<PathBuf>) -> Url {
    resolve(explicit, config_path, |state| state.config.api_port, DEFAULT_API_PORT)
}

/// Resolve the remote URL for the admin client.
///
/// Priority: explicit `--admin-remote` flag > config file `admin_port` > 5002.
pub fn resolve_admin_remote(explicit: Option<Url>, config_path: Option<PathBuf>) -> Url {
    resolve(
        explicit,
        config_path,
        |state| state.config.admin_port,
        DEFAULT_ADMIN_PORT,
    )
}

fn resolve(
    explicit: Option<Url>,
    config_path: Option<PathBuf>,
    port: impl Fn(&AppState) -> u16,
    default_port: u16,
) -> Url {
    if let Some(url) = explicit {
        return url;
    }
    let port = AppState::load(config_path)
        .map(|state| port(&state))
        .unwrap_or(default_port);
    localhost(port)
}

fn localhost(port: u16) -> Url {
    Url::parse(&format!("http://localhost:{}", port)).expect("localhost URL must parse")
}


#[derive(Clone)]
pub struct OpContext {
    /// Public API client, carrying the caller's token when one was given
    pub client: ApiClient,
    /// Admin API client
    pub admin: ApiClient,
    /// Capability from `--token` / `STRATA_TOKEN`
    pub token: Option<String>,
    /// Optional custom config path (defaults to ~/.strata)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    /// Create context with the given remotes, token and optional config path
    pub fn new(
        remote: Url,
        admin_remote: Url,
        token: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let client = ApiClient::new(&remote)?;
        let admin = client.clone().with_remote(&admin_remote);
        let client = match &token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        };
        Ok(Self {
            client,
            admin,
            token,
            config_path,
        })
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
