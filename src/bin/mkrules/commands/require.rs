//! `mkrules mod require` command

use anyhow::Result;

use crate::cli::{GlobalArgs, RequireArgs};
use mkrules::ops::{mod_require, RequireOptions};

pub fn execute(global: &GlobalArgs, args: RequireArgs) -> Result<()> {
    let opts = RequireOptions::from_args(&args.args, args.skip_deps)?;
    let (modfile, _) = super::load_modfile(global)?;

    mod_require(modfile, &opts)?;
    eprintln!("     Pinned {} {}", opts.path, opts.version);
    Ok(())
}
