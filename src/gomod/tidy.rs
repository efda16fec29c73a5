//! Reconciliation driver behind `mod tidy`.
//!
//! Brings a manifest from any state to one where every dependency is
//! explicitly required, every pin that carries information is kept as a
//! replace, and pins the resolver would reach on its own are removed.
//! Every phase re-reads the manifest, so a run interrupted halfway leaves a
//! valid file and the next run picks up from there.

use std::collections::{BTreeMap, BTreeSet};

use crate::gomod::errors::{ModError, PhaseContext, TidyPhase};
use crate::gomod::modfile::ModFile;
use crate::gomod::staging;
use crate::gomod::toolchain::GoToolchain;
use crate::gomod::types::{GoMod, ListModule, Replace};
use crate::gomod::version::is_valid_version;

/// Where a module is pinned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: String,
    pub version: String,
}

/// Desired require and replace for one module path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinState {
    pub path: String,
    pub version: String,
    pub indirect: bool,
    pub replace: Target,
}

/// Working set of one phase, keyed by module path.
pub type ReconciliationState = BTreeMap<String, PinState>;

/// Combine the existing entry for a path with that path's replace directive.
type Merge = fn(PinState, &Replace) -> PinState;

/// State in which existing versions are reconciled with their replaces.
///
/// A path-changing replace always decides the version. Otherwise a valid
/// require version wins over a same-path replace, and an invalid require
/// version takes the replace's.
pub fn merge_strong(gomod: &GoMod) -> ReconciliationState {
    build_state(gomod, |state, replace| {
        let mut version = state.version;
        if is_valid_version(&replace.new.version)
            && (!is_valid_version(&version) || replace.renames())
        {
            version = replace.new.version.clone();
        }
        PinState {
            replace: Target {
                path: replace.new.path.clone(),
                version: version.clone(),
            },
            version,
            ..state
        }
    })
}

/// State that only fills in missing directives and keeps what exists.
pub fn merge_weak(gomod: &GoMod) -> ReconciliationState {
    build_state(gomod, |state, replace| PinState {
        replace: Target {
            path: replace.new.path.clone(),
            version: replace.new.version.clone(),
        },
        ..state
    })
}

fn build_state(gomod: &GoMod, merge: Merge) -> ReconciliationState {
    let mut state: ReconciliationState = gomod
        .require
        .iter()
        .map(|r| {
            let pin = PinState {
                path: r.path.clone(),
                version: r.version.clone(),
                indirect: r.indirect,
                replace: Target {
                    path: r.path.clone(),
                    version: r.version.clone(),
                },
            };
            (r.path.clone(), pin)
        })
        .collect();

    for r in &gomod.replace {
        let pin = match state.remove(&r.old.path) {
            Some(existing) => merge(existing, r),
            None => PinState {
                path: r.old.path.clone(),
                version: synthesized_version(r).to_string(),
                indirect: false,
                replace: Target {
                    path: r.new.path.clone(),
                    version: r.new.version.clone(),
                },
            },
        };
        state.insert(r.old.path.clone(), pin);
    }
    state
}

/// Version of the require written for a replace that has none.
fn synthesized_version(replace: &Replace) -> &str {
    if is_valid_version(&replace.old.version) {
        &replace.old.version
    } else {
        &replace.new.version
    }
}

/// Runs the reconciliation phases against one manifest.
#[derive(Debug)]
pub struct Reconciler<'a, T: GoToolchain> {
    modfile: &'a ModFile<T>,
}

impl<'a, T: GoToolchain> Reconciler<'a, T> {
    pub fn new(modfile: &'a ModFile<T>) -> Self {
        Reconciler { modfile }
    }

    /// Pin, tidy, format and prune the manifest.
    ///
    /// Any failure aborts immediately and names the phase it happened in.
    /// Nothing is rolled back; running again after fixing the cause is safe.
    pub fn prune_and_tidy(&self) -> Result<(), ModError> {
        tracing::info!(modfile = %self.modfile.path().display(), "reconciling go.mod");

        self.ensure_require_and_replace()
            .in_phase(TidyPhase::EnsureRequireAndReplace)?;
        self.modfile.tidy().in_phase(TidyPhase::Tidy)?;
        self.ensure_missing_require_and_replace()
            .in_phase(TidyPhase::EnsureMissingRequireAndReplace)?;
        self.modfile.format().in_phase(TidyPhase::Format)?;

        tracing::info!("pruning replace directives");
        self.prune_replace().in_phase(TidyPhase::PruneReplace)?;
        self.modfile.tidy().in_phase(TidyPhase::FinalTidy)
    }

    /// Give every require an explicit replace and every replace a require,
    /// then pin the rest of the resolved graph.
    pub fn ensure_require_and_replace(&self) -> Result<(), ModError> {
        let state = merge_strong(&self.modfile.parse()?);
        self.flush(&state)?;
        self.backfill_from_resolved()
    }

    /// Add the directives a toolchain tidy left without a counterpart.
    pub fn ensure_missing_require_and_replace(&self) -> Result<(), ModError> {
        let state = merge_weak(&self.modfile.parse()?);
        self.flush(&state)?;
        self.backfill_from_resolved()
    }

    /// Require indirect dependencies explicitly and pin every resolved module
    /// that has no replace yet.
    pub fn backfill_from_resolved(&self) -> Result<(), ModError> {
        for m in self.modfile.list_resolved()? {
            if !is_valid_version(&m.version) {
                continue;
            }
            if m.indirect {
                self.modfile.edit_require(&m.path, &m.version)?;
            }
            if m.replace.is_none() {
                self.modfile.edit_replace(&m.path, &m.path, &m.version)?;
            }
        }
        Ok(())
    }

    /// Drop replaces that are redundant or unused.
    ///
    /// Redundant pins are pruned before tidying, while the require they
    /// duplicate is still present, and once more afterwards because the
    /// tidy can make further pins redundant.
    pub fn prune_replace(&self) -> Result<(), ModError> {
        self.drop_naturally_selected(&self.modfile.list_resolved()?)?;
        self.modfile.tidy()?;
        self.drop_unused(&self.modfile.list_resolved()?)?;
        self.drop_naturally_selected(&self.modfile.list_resolved()?)
    }

    fn drop_naturally_selected(&self, modules: &[ListModule]) -> Result<(), ModError> {
        for m in modules {
            if m.is_naturally_selected() && !staging::is_protected(&m.path) {
                tracing::info!(path = %m.path, version = %m.version, reason = "naturally selected", "drop replace");
                self.modfile.drop_replace(&m.path)?;
            }
        }
        Ok(())
    }

    fn drop_unused(&self, modules: &[ListModule]) -> Result<(), ModError> {
        let used: BTreeSet<&str> = modules.iter().map(|m| m.path.as_str()).collect();
        for r in self.modfile.parse()?.replace {
            if !used.contains(r.old.path.as_str()) {
                tracing::info!(path = %r.old.path, version = %r.new.version, reason = "unused", "drop replace");
                self.modfile.drop_replace(&r.old.path)?;
            }
        }
        Ok(())
    }

    fn flush(&self, state: &ReconciliationState) -> Result<(), ModError> {
        for pin in state.values() {
            let target = &pin.replace;
            if is_valid_version(&pin.version) {
                self.modfile.edit_require(&pin.path, &pin.version)?;
            }
            if is_valid_version(&target.version) {
                self.modfile
                    .edit_replace(&pin.path, &target.path, &target.version)?;
            }
        }
        Ok(())
    }
}
