//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON/YAML file,
//! then environment variables for the naming service. The CLI applies its
//! own arguments last.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::export::ExportSettings;
use crate::pipeline::rename::RenameSettings;
use crate::server::DEFAULT_SERVER_URL;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_MODEL_NAME: &str = "OPENAI_MODEL_NAME";

/// Connection settings for the naming service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            api_key: "SK-XXXXXXXXXXXXXXXXXXXXXXXXXXX".to_string(),
            api_base: "https://api.siliconflow.cn/v1".to_string(),
            model: "Qwen/Qwen2.5-72B-Instruct".to_string(),
            temperature: 0.7,
            max_tokens: 50,
        }
    }
}

/// Complete configuration for one run of either pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Base URL of the analysis server.
    pub server_url: String,
    pub rename: RenameSettings,
    pub export: ExportSettings,
    pub naming: NamingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            rename: RenameSettings::default(),
            export: ExportSettings::default(),
            naming: NamingConfig::default(),
        }
    }
}

impl RunConfig {
    /// Overlay naming-service settings from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay naming-service settings from `lookup`. Empty values are ignored.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(ENV_API_KEY) {
            self.naming.api_key = key;
        }
        if let Some(base) = get(ENV_API_BASE) {
            self.naming.api_base = base;
        }
        if let Some(model) = get(ENV_MODEL_NAME) {
            self.naming.model = model;
        }
        self
    }
}

/// Load a run configuration from a `.json`, `.yaml` or `.yml` file.
///
/// Missing fields take their defaults.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read run config at {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        "json" => serde_json::from_str(&body).context("Failed to parse run config JSON"),
        "yaml" | "yml" => serde_yaml::from_str(&body).context("Failed to parse run config YAML"),
        other => Err(anyhow!("Unsupported run config format '{}' ({})", other, path.display())),
    }
}

