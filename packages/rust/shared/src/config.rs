//! Application configuration for linksorter.
//!
//! User config lives at `~/.linksorter/linksorter.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys never live in the file; only the name of the env var holding one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LinkSorterError, Result};
use crate::types::{CategoryMap, seed_categories};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "linksorter.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".linksorter";

// ---------------------------------------------------------------------------
// Config structs (matching linksorter.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Page fetching settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Language-model settings.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Categories the store is seeded with at startup.
    #[serde(default = "seed_categories")]
    pub categories: CategoryMap,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            fetch: FetchConfig::default(),
            oracle: OracleConfig::default(),
            categories: seed_categories(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: u64,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Maximum redirects followed per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Allow fetching loopback/private addresses.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_fetch_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_redirects: default_max_redirects(),
            allow_private_hosts: false,
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_max_redirects() -> usize {
    5
}

/// `[oracle]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Provider backend: `openai` (hosted, needs an API key),
    /// `openai-compatible` (self-hosted, key optional) or `dummy` (offline).
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Full URL of the chat-completions endpoint.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model ID sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; omitted from requests when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    #[serde(default = "default_oracle_timeout")]
    pub timeout_seconds: u64,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Page text is cut to this many words before it is sent.
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_base_url: default_api_base_url(),
            model: default_model(),
            temperature: None,
            timeout_seconds: default_oracle_timeout(),
            api_key_env: default_api_key_env(),
            max_words: default_max_words(),
        }
    }
}

fn default_provider() -> String {
    "openai".into()
}
fn default_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_oracle_timeout() -> u64 {
    120
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_max_words() -> usize {
    1000
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.linksorter/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LinkSorterError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.linksorter/linksorter.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LinkSorterError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LinkSorterError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| LinkSorterError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| LinkSorterError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| LinkSorterError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

/// Read the oracle API key from the env var named in the config.
pub fn api_key(config: &AppConfig) -> Option<String> {
    std::env::var(&config.oracle.api_key_env)
        .ok()
        .filter(|val| !val.is_empty())
}

/// Check that the API key env var is set when the provider needs one.
///
/// Only the hosted `openai` provider requires a key; `openai-compatible`
/// servers may run keyless.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    if config.oracle.provider != "openai" || api_key(config).is_some() {
        return Ok(());
    }

    let var_name = &config.oracle.api_key_env;
    Err(LinkSorterError::config(format!(
        "API key not found. Set the {var_name} environment variable \
         or switch [oracle] provider to \"dummy\"."
    )))
}
