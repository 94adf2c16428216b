use std::path::{Path, PathBuf};

use anyhow::Context;
use autodb_service::ServiceConfig;
use serde::{Deserialize, Serialize};

/// Host configuration: where the store lives plus the service tunables.
///
/// ```toml
/// store_path = "autodb.json"
///
/// [service]
/// recommend_limit = 5
/// ownership_policy = "delete-only"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store_path: PathBuf,
    pub service: ServiceConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("autodb.json"),
            service: ServiceConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.service.validate()?;
        Ok(config)
    }
}
