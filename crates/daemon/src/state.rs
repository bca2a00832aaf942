use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use common::endpoint::{CipherSuite, EndpointConfig, RedundancyScheme};
use common::pieces::PieceQueueConfig;

use crate::database::DEFAULT_DELETE_BATCH_SIZE;

pub const APP_NAME: &str = "strata";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the public bucket API
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Port for the admin API (bound to localhost only)
    #[serde(default = "default_admin_port")]
    pub admin_port: u16,
    /// Default log level; RUST_LOG overrides it
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Bucket ceiling for projects without an override
    #[serde(default = "default_max_buckets")]
    pub max_buckets: u64,
    /// Segment size reported for every bucket
    #[serde(default = "default_max_segment_size")]
    pub max_segment_size: u64,
    #[serde(default)]
    pub path_cipher: CipherSuite,

    /// Objects deleted per transaction when draining a bucket
    #[serde(default = "default_delete_batch_size")]
    pub delete_batch_size: usize,
    /// Piece batches buffered for the deletion worker; 0 means unbounded
    #[serde(default = "default_piece_queue_size")]
    pub piece_queue_size: usize,

    /// Redundancy scheme reported for every bucket
    #[serde(default)]
    pub redundancy: RedundancyScheme,
}

fn default_api_port() -> u16 {
    5001
}

fn default_admin_port() -> u16 {
    5002
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_buckets() -> u64 {
    common::endpoint::DEFAULT_MAX_BUCKETS
}

fn default_max_segment_size() -> u64 {
    common::endpoint::DEFAULT_MAX_SEGMENT_SIZE
}

fn default_delete_batch_size() -> usize {
    DEFAULT_DELETE_BATCH_SIZE
}

fn default_piece_queue_size() -> usize {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            admin_port: default_admin_port(),
            log_level: default_log_level(),
            max_buckets: default_max_buckets(),
            max_segment_size: default_max_segment_size(),
            path_cipher: CipherSuite::default(),
            delete_batch_size: default_delete_batch_size(),
            piece_queue_size: default_piece_queue_size(),
            redundancy: RedundancyScheme::default(),
        }
    }
}

impl AppConfig {
    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig {
            max_buckets: self.max_buckets,
            max_segment_size: self.max_segment_size,
            redundancy: self.redundancy,
            path_cipher: self.path_cipher,
        }
    }

    pub fn piece_queue_config(&self) -> PieceQueueConfig {
        PieceQueueConfig {
            max_queue_size: (self.piece_queue_size > 0).then_some(self.piece_queue_size),
        }
    }

    /// Falls back to INFO for unrecognised levels.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the strata directory (~/.strata)
    pub strata_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the strata directory path (custom or default ~/.strata)
    pub fn strata_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new strata state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let strata_dir = Self::strata_dir(custom_path)?;

        if strata_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&strata_dir)?;

        let config = config.unwrap_or_default();
        let config_path = strata_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // the daemon creates and migrates the database on first start
        let db_path = strata_dir.join(DB_FILE_NAME);

        Ok(Self {
            strata_dir,
            db_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the strata directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let strata_dir = Self::strata_dir(custom_path)?;

        if !strata_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = strata_dir.join(DB_FILE_NAME);
        let config_path = strata_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            strata_dir,
            db_path,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("strata directory not initialized. Run 'strata init' first")]
    NotInitialized,

    #[error("strata directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
