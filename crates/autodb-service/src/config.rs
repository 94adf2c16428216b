use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which mutations require the caller to own the record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipPolicy {
    /// Only `delete` is owner-gated.
    #[default]
    DeleteOnly,
    /// `update`, `update_owner`, `update_image` and `delete` are all
    /// owner-gated.
    AllMutations,
}

/// Tunables for [`CarService`](crate::CarService).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// How many records `recommend` returns.
    pub recommend_limit: usize,
    /// Ownership gate applied to mutations.
    pub ownership_policy: OwnershipPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            recommend_limit: 5,
            ownership_policy: OwnershipPolicy::DeleteOnly,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ServiceConfig {
    /// Every mutation owner-gated.
    pub fn strict() -> Self {
        Self {
            ownership_policy: OwnershipPolicy::AllMutations,
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recommend_limit == 0 {
            return Err(ConfigError::Invalid(
                "recommend_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn gates_all_mutations(&self) -> bool {
        self.ownership_policy == OwnershipPolicy::AllMutations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServiceConfig::default();
        assert_eq!(c.recommend_limit, 5);
        assert_eq!(c.ownership_policy, OwnershipPolicy::DeleteOnly);
        assert!(!c.gates_all_mutations());
        assert!(ServiceConfig::strict().gates_all_mutations());
    }

    #[test]
    fn parse_full_toml() {
        let c = ServiceConfig::from_toml_str(
            r#"
            recommend_limit = 3
            ownership_policy = "all-mutations"
            "#,
        )
        .unwrap();
        assert_eq!(c.recommend_limit, 3);
        assert_eq!(c.ownership_policy, OwnershipPolicy::AllMutations);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let c = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(c, ServiceConfig::default());
    }

    #[test]
    fn zero_recommend_limit_is_rejected() {
        let err = ServiceConfig::from_toml_str("recommend_limit = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = ServiceConfig::from_toml_str(r#"ownership_policy = "nobody""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autodb.toml");
        std::fs::write(&path, "recommend_limit = 2\n").unwrap();
        assert_eq!(ServiceConfig::load(&path).unwrap().recommend_limit, 2);
    }
}
