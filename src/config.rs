//! Client configuration reading and parsing.
//!
//! Locates and parses an INI-format configuration file describing how to
//! reach the platform API.

use std::env;
use std::path::PathBuf;

use configparser::ini::Ini;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

const ENV_CONFIG_FILE: &str = "GITNAV_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".gitnavconfig";

const API_SECTION: &str = "api";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("no config file found and no explicit path given")]
    NoConfigFile,

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid integer '{value}' for key '{key}': {source}")]
    InvalidInteger {
        key: String,
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("missing required field '{field}' in section '{section}'")]
    MissingRequiredField { section: String, field: String },
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path. If specified and it doesn't exist, error.
    /// If None, fall back to GITNAV_CONFIG_FILE, then ~/.gitnavconfig.
    pub config_file: Option<PathBuf>,
}

// =============================================================================
// ApiConfig
// =============================================================================

/// Connection settings for the platform API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the API server.
    pub base_url: String,
    /// The project whose providers and repositories are browsed.
    pub project_id: u64,
    /// Optional bearer token.
    pub token: Option<String>,
}

// =============================================================================
// Reading
// =============================================================================

/// Read the API configuration described by `source`.
pub fn read_config(source: &ConfigSource) -> Result<ApiConfig> {
    let path = resolve_config_file(source)?;

    let mut ini = Ini::new();
    ini.load(&path).map_err(|message| ConfigError::ParseError {
        path: path.clone(),
        message,
    })?;

    let base_url = require(&ini, API_SECTION, "base_url")?;
    let project_id = parse_u64(&ini, API_SECTION, "project_id")?;
    let token = ini.get(API_SECTION, "token");

    Ok(ApiConfig {
        base_url,
        project_id,
        token,
    })
}

fn require(ini: &Ini, section: &str, field: &str) -> Result<String> {
    ini.get(section, field)
        .ok_or_else(|| ConfigError::MissingRequiredField {
            section: section.to_string(),
            field: field.to_string(),
        })
}

fn parse_u64(ini: &Ini, section: &str, key: &str) -> Result<u64> {
    let value = require(ini, section, key)?;
    value.parse().map_err(|e| ConfigError::InvalidInteger {
        key: key.to_string(),
        value,
        source: e,
    })
}

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> Result<PathBuf> {
    // If an explicit path is provided, it must exist.
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(ConfigError::FileNotFound(path.clone()));
    }

    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(path));
    }

    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(default_path);
        }
    }

    Err(ConfigError::NoConfigFile)
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}
