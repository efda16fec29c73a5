//! Locating and checking the Go toolchain.

use std::path::Path;

use anyhow::{Context, Result};

use crate::gomod::version::verify_go_version;
use crate::gomod::{GoCommand, GoToolchain, ModFile};
use crate::util::Config;

/// The `go` binary named in the config, or the one on `PATH`.
pub fn go_command(config: &Config) -> Result<GoCommand> {
    let go = match &config.toolchain.go {
        Some(program) => GoCommand::new(program),
        None => GoCommand::detect()?,
    };
    tracing::debug!(go = %go.program().display(), "using go toolchain");
    Ok(go.with_env(config.toolchain.env.clone()))
}

/// Bind `path` to `go`, failing early when the toolchain is too old.
pub fn open_modfile<T: GoToolchain>(path: &Path, go: T) -> Result<ModFile<T>> {
    let modfile = ModFile::new(path, go);
    let version = modfile
        .go_version()
        .with_context(|| format!("failed to detect go version for {}", path.display()))?;
    verify_go_version(&version)?;
    tracing::debug!(%version, "detected go version");
    Ok(modfile)
}
