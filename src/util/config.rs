//! Configuration file support for mkrules.
//!
//! mkrules reads two configuration files:
//! - Global: `~/.mkrules/config.toml` - User-wide defaults
//! - Project: `.mkrules/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::gomod::PinRequest;

/// mkrules configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Go toolchain settings
    pub toolchain: ToolchainSettings,

    /// Declarative pins applied by `mod update`
    #[serde(rename = "mod")]
    pub modules: ModConfig,
}

/// Go toolchain settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the go binary (e.g., /usr/local/go/bin/go)
    pub go: Option<PathBuf>,

    /// Extra environment for every go invocation (e.g., GOPROXY)
    pub env: BTreeMap<String, String>,
}

/// Pins applied by `mod update`, requires first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModConfig {
    pub require: Vec<RequireConfig>,
    pub replace: Vec<ReplaceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RequireConfig {
    pub path: String,
    pub version: String,
    pub skip_deps: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReplaceConfig {
    pub path: String,
    /// Defaults to `path`
    pub new_path: Option<String>,
    pub version: String,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.toolchain.go.is_some() {
            self.toolchain.go = other.toolchain.go;
        }
        self.toolchain.env.extend(other.toolchain.env);

        // Pin lists are replaced wholesale
        if !other.modules.require.is_empty() {
            self.modules.require = other.modules.require;
        }
        if !other.modules.replace.is_empty() {
            self.modules.replace = other.modules.replace;
        }
    }

    /// The configured pins in the order `mod update` applies them.
    pub fn pin_requests(&self) -> Vec<PinRequest> {
        let requires = self
            .modules
            .require
            .iter()
            .map(|r| PinRequest::require(&r.path, &r.version, r.skip_deps));
        let replaces = self.modules.replace.iter().map(|r| {
            let new_path = r.new_path.as_deref().unwrap_or(&r.path);
            PinRequest::replace(&r.path, new_path, &r.version)
        });
        requires.chain(replaces).collect()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.mkrules/config.toml)
/// 2. Global config (~/.mkrules/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global mkrules config directory (~/.mkrules).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".mkrules"))
}

/// Get the global config path (~/.mkrules/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.mkrules/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".mkrules").join("config.toml")
}
