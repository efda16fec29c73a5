//! `mkrules mod replace` command

use anyhow::Result;

use crate::cli::{GlobalArgs, ReplaceArgs};
use mkrules::ops::{mod_replace, ReplaceOptions};

pub fn execute(global: &GlobalArgs, args: ReplaceArgs) -> Result<()> {
    let opts = ReplaceOptions::from_args(&args.args)?;
    let (modfile, _) = super::load_modfile(global)?;

    mod_replace(modfile, &opts)?;
    eprintln!("   Replaced {} => {} {}", opts.old_path, opts.new_path, opts.version);
    Ok(())
}
