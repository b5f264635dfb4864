//! Configuration for the lectern client.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (LECTERN_HOME, LECTERN_API_URL)
//! 2. Config file (.lectern/config.yaml)
//! 3. Defaults (~/.lectern, http://localhost:8080)
//!
//! Config file discovery:
//! - Searches current directory and parents for .lectern/config.yaml
//! - Relative paths in the config file resolve against the .lectern/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::session::ClassifyPolicy;

pub mod paths;

/// Default course service root
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub session: Option<SessionConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Session file (relative to .lectern/)
    pub file: Option<String>,
    /// Treat "token"/"expired"/"invalid" in error text as a dead session
    pub text_heuristic: Option<bool>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Client state directory
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// API settings
    pub api: ApiSettings,
    /// Session settings
    pub session: SessionSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub file: PathBuf,
    pub text_heuristic: bool,
}

impl SessionSettings {
    pub fn policy(&self) -> ClassifyPolicy {
        ClassifyPolicy {
            text_heuristic: self.text_heuristic,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".lectern").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge the config file (if any) with environment overrides and defaults
fn resolve(
    config_path: Option<&Path>,
    config: Option<ConfigFile>,
    env_home: Option<String>,
    env_api_url: Option<String>,
) -> Result<ResolvedConfig> {
    let default_home = || -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(".lectern"))
    };

    // .lectern/ directory holding the config file
    let config_dir = config_path
        .and_then(Path::parent)
        .unwrap_or(Path::new("."));

    let api = config.as_ref().and_then(|c| c.api.clone()).unwrap_or_default();
    let session = config
        .as_ref()
        .and_then(|c| c.session.clone())
        .unwrap_or_default();

    let home = if let Some(env_home) = env_home {
        PathBuf::from(env_home)
    } else if let Some(home_path) = config.as_ref().and_then(|c| c.home.as_deref()) {
        resolve_path(config_dir, home_path)
    } else {
        default_home()?
    };

    let defaults = ApiSettings::default();
    let api = ApiSettings {
        base_url: env_api_url
            .or(api.base_url)
            .unwrap_or(defaults.base_url),
        timeout_seconds: api.timeout_seconds.unwrap_or(defaults.timeout_seconds),
    };

    let session = SessionSettings {
        file: session
            .file
            .as_deref()
            .map(|f| resolve_path(config_dir, f))
            .unwrap_or_else(|| paths::session_file_in(&home)),
        text_heuristic: session.text_heuristic.unwrap_or(true),
    };

    Ok(ResolvedConfig {
        home,
        config_file: config_path.map(Path::to_path_buf),
        api,
        session,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let config = config_file
        .as_deref()
        .map(load_config_file)
        .transpose()?;

    resolve(
        config_file.as_deref(),
        config,
        std::env::var("LECTERN_HOME").ok(),
        std::env::var("LECTERN_API_URL").ok(),
    )
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
