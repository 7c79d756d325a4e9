use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chaining::DEFAULT_MAX_CHAIN_DEPTH;
use crate::error::Result;

/// Start-up settings for the capability catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityConfig {
    /// External catalog asset. The bundled R4 catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Maximum number of links in a chained search key
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,
    /// Narrows the server-supported resource types
    #[serde(default)]
    pub supported_resource_types: Option<Vec<String>>,
    /// Narrows the server-supported compartments
    #[serde(default)]
    pub supported_compartments: Option<Vec<String>>,
}

fn default_max_chain_depth() -> usize {
    DEFAULT_MAX_CHAIN_DEPTH
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            max_chain_depth: default_max_chain_depth(),
            supported_resource_types: None,
            supported_compartments: None,
        }
    }
}

impl CapabilityConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read settings from a TOML file. A missing file yields the defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Capability config file does not exist");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
