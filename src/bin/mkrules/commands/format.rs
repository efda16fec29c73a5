//! `mkrules mod format` command

use anyhow::Result;

use crate::cli::GlobalArgs;
use mkrules::ops::mod_format;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (modfile, _) = super::load_modfile(global)?;
    mod_format(&modfile)
}
