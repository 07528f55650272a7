//! Generator configuration from `msql.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dialect::Dialect;
use crate::error::{MsqlError, MsqlResult};

pub const CONFIG_FILE: &str = "msql.toml";

/// Generator configuration.
///
/// ```toml
/// default_dialect = "postgres"
/// scan_item = "row"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Dialect for tables that do not name one
    pub default_dialect: String,
    /// Receiver name used when rendering scan targets
    pub scan_item: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_dialect: Dialect::MySql.name().to_string(),
            scan_item: "item".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load from `path`, else `./msql.toml`, else `<config dir>/msql/msql.toml`.
    /// Only an explicit path is required to exist.
    pub fn load(path: Option<&Path>) -> MsqlResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        for candidate in Self::search_paths() {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        tracing::debug!("no {} found, using defaults", CONFIG_FILE);
        Ok(Self::default())
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("msql").join(CONFIG_FILE));
        }
        paths
    }

    pub fn from_file(path: &Path) -> MsqlResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| MsqlError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate. An unknown default dialect is rejected here.
    pub fn from_toml(content: &str) -> MsqlResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| MsqlError::Config(e.to_string()))?;
        config.default_dialect()?;
        Ok(config)
    }

    pub fn default_dialect(&self) -> MsqlResult<Dialect> {
        Dialect::from_name(&self.default_dialect)
    }
}
