//! Configuration resolution for the ephys workflow
//!
//! Configuration is an explicit value threaded through the workflow; nothing
//! reads ambient global state after resolution. Each setting resolves with
//! the priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Absent (a valid state until a code path actually needs the value)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the raw-recording root directory
pub const ROOT_ENV_VAR: &str = "EPHYS_ROOT_DATA_DIR";
/// Environment variable naming the processed-output root directory
pub const PROCESSED_ENV_VAR: &str = "EPHYS_PROCESSED_DATA_DIR";
/// Environment variable naming the SQLite database path
pub const DATABASE_ENV_VAR: &str = "EPHYS_DATABASE_PATH";

/// TOML config file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub ephys_root_data_dir: Option<PathBuf>,
    pub ephys_processed_data_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
}

/// Resolved workflow configuration
#[derive(Debug, Clone, Default)]
pub struct EphysConfig {
    ephys_root_data_dir: Option<PathBuf>,
    ephys_processed_data_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
}

impl EphysConfig {
    /// Build a configuration from already-known values (tests, embedding)
    pub fn new(
        ephys_root_data_dir: Option<PathBuf>,
        ephys_processed_data_dir: Option<PathBuf>,
        database_path: Option<PathBuf>,
    ) -> Self {
        Self {
            ephys_root_data_dir,
            ephys_processed_data_dir,
            database_path,
        }
    }

    /// Resolve configuration from CLI arguments, environment, and the
    /// platform TOML config file
    pub fn resolve(cli_root: Option<&Path>, cli_database: Option<&Path>) -> Self {
        let file = load_config_file()
            .and_then(|path| read_toml_config(&path))
            .unwrap_or_default();

        Self {
            ephys_root_data_dir: pick(cli_root, env_path(ROOT_ENV_VAR), file.ephys_root_data_dir),
            ephys_processed_data_dir: pick(
                None,
                env_path(PROCESSED_ENV_VAR),
                file.ephys_processed_data_dir,
            ),
            database_path: pick(cli_database, env_path(DATABASE_ENV_VAR), file.database_path),
        }
    }

    /// Configured root data directory, if any
    pub fn root_data_dir(&self) -> Option<&Path> {
        self.ephys_root_data_dir.as_deref()
    }

    /// Configured processed-output directory, if any
    pub fn processed_data_dir(&self) -> Option<&Path> {
        self.ephys_processed_data_dir.as_deref()
    }

    /// Root data directory, or a configuration error when unset
    pub fn require_root(&self) -> Result<&Path> {
        self.root_data_dir()
            .ok_or_else(|| Error::Config("ephys_root_data_dir is not configured".to_string()))
    }

    /// SQLite database path (defaults to ./ephys.db when unset)
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("./ephys.db"))
    }
}

/// Apply the CLI → ENV → TOML priority order to one setting
fn pick(cli: Option<&Path>, env: Option<PathBuf>, file: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = cli {
        return Some(path.to_path_buf());
    }
    env.or(file)
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).map(PathBuf::from)
}

/// Find the configuration file for the platform
fn load_config_file() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/ephys-workflow/config.toml first, then /etc
        let user_config = dirs::config_dir().map(|d| d.join("ephys-workflow").join("config.toml"));
        if let Some(path) = user_config {
            if path.exists() {
                return Some(path);
            }
        }
        let system_config = PathBuf::from("/etc/ephys-workflow/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        None
    } else {
        dirs::config_dir()
            .map(|d| d.join("ephys-workflow").join("config.toml"))
            .filter(|p| p.exists())
    }
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Option<TomlConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!("Config file {} not readable: {}", path.display(), e);
            return None;
        }
    };
    match toml::from_str(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            debug!("Config file {} not parseable: {}", path.display(), e);
            None
        }
    }
}
