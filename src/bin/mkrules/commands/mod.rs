//! Command implementations

pub mod completions;
pub mod format;
pub mod replace;
pub mod require;
pub mod tidy;
pub mod update;
pub mod version;

use anyhow::Result;

use crate::cli::GlobalArgs;
use mkrules::gomod::{GoCommand, ModFile};
use mkrules::ops::{go_command, open_modfile};
use mkrules::util::{Config, GlobalContext};

/// Context for the working directory selected on the command line.
pub fn context(global: &GlobalArgs) -> Result<GlobalContext> {
    let mut ctx = match &global.workspace {
        Some(dir) => GlobalContext::with_cwd(dir.clone())?,
        None => GlobalContext::new()?,
    };
    ctx.set_verbose(global.verbose);
    Ok(ctx)
}

/// Locate go.mod, load the configuration and bind the toolchain.
pub fn load_modfile(global: &GlobalArgs) -> Result<(ModFile<GoCommand>, Config)> {
    let ctx = context(global)?;
    let path = ctx.find_modfile()?;
    let config = ctx.load_config();
    let go = go_command(&config)?;
    let modfile = open_modfile(&path, go)?;
    Ok((modfile, config))
}
