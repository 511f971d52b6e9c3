//! Static inhibition rules described in a TOML file
//!
//! A rule file lists the inhibition rules to register at startup:
//!
//! ```toml
//! [[rules]]
//! name = "cpu_high"
//! active = true
//! tags = { host = "db1" }
//! ```

use crate::error::ConfigError;
use crate::inhibit::{InhibitionRule, InhibitorRegistry, Tags};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Rule file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Rules to register, in file order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// One inhibition rule as written in the rule file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Alert name the rule applies to
    pub name: String,
    /// Initial state of the rule
    #[serde(default)]
    pub active: bool,
    /// Tag filter; omitted means the rule covers every alert with this name
    #[serde(default)]
    pub tags: Tags,
}

impl RuleConfig {
    /// Build a shareable rule from this description
    pub fn build(&self) -> Arc<InhibitionRule> {
        Arc::new(InhibitionRule::new(
            self.name.clone(),
            self.tags.clone(),
            self.active,
        ))
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a rule file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML for this schema and
    /// `ConfigError::ValidationError` if a rule is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            "Loaded {} inhibition rule(s) from {}",
            config.rules.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate rule file contents
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a rule file if one was given, falling back to an empty rule set
    /// when the file does not exist
    ///
    /// Files that exist but fail to parse or validate are still reported as
    /// errors.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if !path.exists() => {
                warn!(
                    "Rule file '{}' not found, starting with no inhibition rules",
                    path.display()
                );
                Ok(Self::default())
            }
            Some(path) => Self::from_file(path),
            None => {
                info!("No rule file given, starting with no inhibition rules");
                Ok(Self::default())
            }
        }
    }

    /// Check that every rule names an alert and uses non-empty tag keys
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (position, rule) in self.rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "rules[{}]: name must not be empty",
                    position
                )));
            }
            if rule.tags.keys().any(|key| key.is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "rules[{}] ('{}'): tag keys must not be empty",
                    position, rule.name
                )));
            }
        }
        Ok(())
    }

    /// Build a registry seeded with every configured rule
    ///
    /// The rule handles are returned alongside the registry, in file order, so
    /// the caller can later toggle or remove the seeded rules.
    pub fn build_registry(&self) -> (InhibitorRegistry, Vec<Arc<InhibitionRule>>) {
        let registry = InhibitorRegistry::new();
        let rules: Vec<_> = self.rules.iter().map(RuleConfig::build).collect();
        for rule in &rules {
            registry.add(rule.clone());
        }
        (registry, rules)
    }
}
