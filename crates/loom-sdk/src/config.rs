use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use loom_graph::LayoutConfig;
use loom_store::StoreConfig;

use crate::error::{SdkError, SdkResult};

/// Top-level configuration, usually read from a `loom.toml`:
///
/// ```toml
/// [layout]
/// horizontal_spacing = 250.0
/// vertical_spacing = 150.0
///
/// [store]
/// channel_capacity = 64
/// ```
///
/// Every section and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoomConfig {
    pub layout: LayoutConfig,
    pub store: StoreConfig,
}

impl LoomConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading configuration");
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> SdkResult<()> {
        self.layout.validate()?;
        if self.store.channel_capacity == 0 {
            return Err(SdkError::Config(
                "store.channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
