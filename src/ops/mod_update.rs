//! Implementation of `mkrules mod update`.
//!
//! Applies the pins declared under `[mod]` in the configuration, then
//! reconciles the manifest.

use anyhow::{Context, Result};

use crate::gomod::{GoToolchain, ModFile, PinRequest, Pinner, Reconciler};

/// Apply `requests` in order, then tidy. Returns the paths pinned.
pub fn mod_update<T: GoToolchain>(modfile: ModFile<T>, requests: &[PinRequest]) -> Result<Vec<String>> {
    if requests.is_empty() {
        tracing::info!("no pins configured, only reconciling");
    }

    let mut pinner = Pinner::new(modfile);
    for request in requests {
        pinner
            .apply(request)
            .with_context(|| format!("failed to pin `{}`", request.old_path))?;
    }

    Reconciler::new(pinner.modfile()).prune_and_tidy()?;
    Ok(pinner.pinned().iter().cloned().collect())
}
