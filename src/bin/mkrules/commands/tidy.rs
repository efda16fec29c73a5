//! `mkrules mod tidy` command

use anyhow::Result;

use crate::cli::GlobalArgs;
use mkrules::ops::mod_tidy;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (modfile, _) = super::load_modfile(global)?;
    mod_tidy(&modfile)?;
    eprintln!("     Tidied {}", modfile.path().display());
    Ok(())
}
