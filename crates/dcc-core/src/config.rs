//! Analysis configuration

use crate::catalog::Catalog;
use crate::error::{ClassificationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default capacity of the inference cache
pub const DEFAULT_CACHE_CAPACITY: usize = 300;

/// Settings for one analysis run
///
/// ```toml
/// cache_capacity = 500
///
/// [aliases]
/// Secret = "Restricted"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Maximum number of declarations kept in the inference cache
    pub cache_capacity: usize,
    /// Extra alias spellings, merged over the built-in alias table
    pub aliases: BTreeMap<String, String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            aliases: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ClassificationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(ClassificationError::InvalidConfig {
                reason: "cache_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The standard catalog extended with this configuration's aliases
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::standard().with_aliases(&self.aliases)
    }
}
