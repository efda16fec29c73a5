//! Global context for mkrules operations.
//!
//! Provides centralized access to the working directory, the mkrules home
//! directory and the configuration files under it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::gomod::GO_MOD;
use crate::util::config::{self, Config};

/// Error locating the module manifest.
#[derive(Debug, Error)]
pub enum ModFileError {
    #[error("could not find `go.mod` in `{}` or any parent directory", dir.display())]
    NotFound { dir: PathBuf },
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global mkrules data (~/.mkrules/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(".mkrules"));

        Ok(GlobalContext {
            cwd,
            home,
            verbose: false,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the mkrules home directory (~/.mkrules/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Find `go.mod` starting from cwd and searching upward.
    pub fn find_modfile(&self) -> Result<PathBuf, ModFileError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(GO_MOD);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(ModFileError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }

    /// Find the module root (directory containing go.mod).
    pub fn find_module_root(&self) -> Result<PathBuf, ModFileError> {
        self.find_modfile().map(|p| match p.parent() {
            Some(parent) => parent.to_path_buf(),
            None => self.cwd.clone(),
        })
    }

    /// Load the global config merged with the project config of the module
    /// root, or of cwd outside a module.
    pub fn load_config(&self) -> Config {
        let root = self.find_module_root().unwrap_or_else(|_| self.cwd.clone());
        config::load_config(&self.config_path(), &config::project_config_path(&root))
    }
}
