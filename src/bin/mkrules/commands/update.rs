//! `mkrules mod update` command

use anyhow::Result;

use crate::cli::GlobalArgs;
use mkrules::ops::mod_update;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (modfile, config) = super::load_modfile(global)?;

    let pinned = mod_update(modfile, &config.pin_requests())?;
    eprintln!("{}", summary(pinned.len()));
    Ok(())
}

fn summary(pinned: usize) -> String {
    format!("    Updated {} pinned modules", pinned)
}
