//! Layered configuration.
//!
//! Uses `figment`: built-in defaults, then the user config file
//! (`~/.config/updrs/config.toml`), then an explicitly supplied file, then
//! `UPDRS_`-prefixed environment variables (`UPDRS_PREDICTOR__BASE_URL`,
//! `UPDRS_GATEWAY__PORT`, ...), then programmatic overrides.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration shared by the CLI and the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub predictor: PredictorConfig,
    pub history: HistoryConfig,
    pub identity: IdentityConfig,
    pub gateway: GatewayConfig,
}

/// Where the CLI sends prediction requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Base URL of the prediction endpoint, usually the local gateway.
    pub base_url: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

/// Where submission history is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// History file path; defaults to `history.jsonl` in the user data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl HistoryConfig {
    /// The effective history file path.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        directories::ProjectDirs::from("org", "updrs", "updrs")
            .map(|d| d.data_dir().join("history.jsonl"))
            .unwrap_or_else(|| PathBuf::from("history.jsonl"))
    }
}

/// Who owns new submissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// User identifier attached to submissions; omit to submit anonymously.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// The HTTP gateway's listen address and upstream predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the model server the gateway forwards to.
    pub upstream: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            upstream: "http://localhost:8000".to_string(),
        }
    }
}

/// Path of the user-level config file, when a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "updrs", "updrs")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `UPDRS_`, `__` splits sections)
/// 3. Explicit config file (`--config`)
/// 4. User config (`~/.config/updrs/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    config_file: Option<&Path>,
    overrides: Option<&AppConfig>,
) -> Result<AppConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(path) = config_file {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("UPDRS_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// A commented starter config file, written by `updrs config init`.
pub fn starter_config_toml() -> String {
    let defaults = AppConfig::default();
    format!(
        "\
# updrs configuration
#
# Any value here can be overridden with an UPDRS_-prefixed environment
# variable, e.g. UPDRS_PREDICTOR__BASE_URL or UPDRS_GATEWAY__PORT.

[predictor]
# Prediction endpoint the CLI submits to (usually the local gateway).
base_url = \"{base_url}\"

[history]
# Uncomment to move the submission history file.
# path = \"/path/to/history.jsonl\"

[identity]
# Uncomment to attach a user id to new submissions.
# user_id = \"clinician-7\"

[gateway]
host = \"{host}\"
port = {port}
# Model server the gateway forwards /predict to.
upstream = \"{upstream}\"
",
        base_url = defaults.predictor.base_url,
        host = defaults.gateway.host,
        port = defaults.gateway.port,
        upstream = defaults.gateway.upstream,
    )
}
