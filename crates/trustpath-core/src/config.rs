use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// Configuration for the path resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of trustline crossings. `0` restricts resolution to
    /// direct holdings; `1` enables the one-hop search.
    pub max_hops: u32,
    /// Treat every asset the payer issues as available funding for a
    /// crossing, without checking issuance limits.
    pub include_issuance: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_hops: 1,
            include_issuance: true,
        }
    }
}

impl ResolverConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, CoreError> {
        toml::from_str(s).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded resolver configuration");
        Ok(config)
    }
}
