//! Implementation of `mkrules mod tidy` and `mkrules mod format`.

use anyhow::Result;

use crate::gomod::{GoToolchain, ModFile, Reconciler};

/// Reconcile the manifest down to a minimal, converged set of pins.
pub fn mod_tidy<T: GoToolchain>(modfile: &ModFile<T>) -> Result<()> {
    Reconciler::new(modfile).prune_and_tidy()?;
    Ok(())
}

/// Rewrite the manifest in canonical form.
pub fn mod_format<T: GoToolchain>(modfile: &ModFile<T>) -> Result<()> {
    modfile.format()?;
    Ok(())
}
