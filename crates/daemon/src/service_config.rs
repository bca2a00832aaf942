use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use common::endpoint::EndpointConfig;
use common::pieces::PieceQueueConfig;

use crate::database::DEFAULT_DELETE_BATCH_SIZE;
use crate::state::AppConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration - separate listeners for the public and admin APIs
    /// address for the bucket API server (public)
    pub api_listen_addr: SocketAddr,
    /// address for the admin API server (project + key management);
    ///  should stay on a loopback interface
    pub admin_listen_addr: SocketAddr,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,
    /// objects removed per transaction when draining a bucket
    pub delete_batch_size: usize,

    // bucket endpoint
    pub endpoint: EndpointConfig,
    pub piece_queue: PieceQueueConfig,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5001),
            admin_listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5002),
            sqlite_path: None,
            delete_batch_size: DEFAULT_DELETE_BATCH_SIZE,
            endpoint: EndpointConfig::default(),
            piece_queue: PieceQueueConfig::default(),
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}

impl Config {
    /// Build a service config from the on-disk app config
    pub fn from_app_config(app: &AppConfig, sqlite_path: Option<PathBuf>) -> Self {
        Self {
            api_listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), app.api_port),
            admin_listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), app.admin_port),
            sqlite_path,
            delete_batch_size: app.delete_batch_size,
            endpoint: app.endpoint_config(),
            piece_queue: app.piece_queue_config(),
            log_level: app.tracing_level(),
            log_dir: None,
        }
    }
}
