//! Version pinning engine.
//!
//! A pin is a `require path version` plus a `replace path => new version`
//! written together, so the toolchain can never select another version.
//! Every edit overwrites the previous directive for the same path, which
//! makes re-running a failed or completed pin safe.

use std::collections::BTreeSet;
use std::path::Path;

use tempfile::TempDir;

use crate::gomod::errors::ModError;
use crate::gomod::modfile::{ModFile, GO_MOD};
use crate::gomod::staging::{self, StagingMonorepo};
use crate::gomod::toolchain::{GoCommand, GoToolchain};
use crate::gomod::types::{DownloadModule, GoMod, PinKind, PinRequest};
use crate::gomod::version::{is_valid_version, ZERO_VERSION};

/// Pins modules in one manifest.
#[derive(Debug)]
pub struct Pinner<T: GoToolchain = GoCommand> {
    modfile: ModFile<T>,
    download_dir: Option<TempDir>,
    pinned: BTreeSet<String>,
}

impl<T: GoToolchain> Pinner<T> {
    pub fn new(modfile: ModFile<T>) -> Self {
        Pinner {
            modfile,
            download_dir: None,
            pinned: BTreeSet::new(),
        }
    }

    pub fn modfile(&self) -> &ModFile<T> {
        &self.modfile
    }

    /// Paths pinned by this engine so far.
    pub fn pinned(&self) -> &BTreeSet<String> {
        &self.pinned
    }

    /// Run a [`PinRequest`].
    pub fn apply(&mut self, request: &PinRequest) -> Result<(), ModError> {
        match request.kind {
            PinKind::Require => self.require(&request.old_path, &request.version, request.skip_deps),
            PinKind::Replace => {
                self.replace(&request.old_path, &request.new_path, &request.version)
            }
        }
    }

    /// Pin `path` at the version `version` resolves to.
    ///
    /// `version` may be anything the toolchain accepts as a query, such as a
    /// branch name. Unless `skip_deps` is set, the requirements declared by
    /// the module itself are copied into the manifest first.
    pub fn require(&mut self, path: &str, version: &str, skip_deps: bool) -> Result<(), ModError> {
        tracing::info!(path, version, skip_deps, "mod require");
        let module = self.download(path, version)?;
        let resolved = resolved_version(&module, version);

        let monorepo = staging::find(path);
        if monorepo.is_some() || !skip_deps {
            let deps = self.fetch_manifest(&module)?;
            if let Some(monorepo) = monorepo {
                self.reconcile_staging(monorepo, &deps, &resolved)?;
            }
            if !skip_deps {
                self.require_transitive(&deps)?;
            }
        }

        self.pin(path, path, &resolved)
    }

    /// Redirect `old` to `new` at `version`.
    ///
    /// An invalid version means an unversioned target such as a local
    /// directory: only the replace is written and nothing is downloaded.
    pub fn replace(&mut self, old: &str, new: &str, version: &str) -> Result<(), ModError> {
        if !is_valid_version(version) {
            tracing::info!(old, new, "replace with unversioned target");
            self.modfile.edit_replace(old, new, ZERO_VERSION)?;
            self.pinned.insert(old.to_string());
            return Ok(());
        }

        let module = self.download(new, version)?;
        let resolved = resolved_version(&module, version);
        self.pin(old, new, &resolved)
    }

    fn pin(&mut self, old: &str, new: &str, version: &str) -> Result<(), ModError> {
        tracing::info!(old, new, version, "pin dependency");
        self.modfile.edit_require(old, version)?;
        self.modfile.edit_replace(old, new, version)?;
        self.pinned.insert(old.to_string());
        Ok(())
    }

    /// Copy the module's own requirements. Requires come before replaces and
    /// a later edit of the same path wins.
    fn require_transitive(&self, deps: &GoMod) -> Result<(), ModError> {
        for r in deps.require.iter().filter(|r| is_valid_version(&r.version)) {
            tracing::debug!(path = %r.path, version = %r.version, source = "require", "require");
            self.modfile.edit_require(&r.path, &r.version)?;
        }
        for r in deps.replace.iter().filter(|r| is_valid_version(&r.new.version)) {
            tracing::debug!(path = %r.old.path, version = %r.new.version, source = "replace", "require");
            self.modfile.edit_require(&r.old.path, &r.new.version)?;
        }
        Ok(())
    }

    /// Pin every module the monorepo serves from its staging tree to the
    /// tag matching the monorepo release.
    fn reconcile_staging(
        &mut self,
        monorepo: &StagingMonorepo,
        deps: &GoMod,
        version: &str,
    ) -> Result<(), ModError> {
        let tag = monorepo.staging_tag(version);
        let staged: Vec<String> = monorepo
            .staged_modules(deps)
            .into_iter()
            .map(str::to_string)
            .collect();

        for path in &staged {
            let module = self.download(path, &tag)?;
            let resolved = resolved_version(&module, &tag);
            tracing::info!(path = %path, version = %resolved, "pin staging module");
            self.pin(path, path, &resolved)?;
        }
        Ok(())
    }

    fn download(&mut self, path: &str, version: &str) -> Result<DownloadModule, ModError> {
        let dir = self.download_dir()?.to_path_buf();
        self.modfile.download(&dir, path, version)
    }

    fn download_dir(&mut self) -> Result<&Path, ModError> {
        let dir = match self.download_dir.take() {
            Some(dir) => dir,
            None => staging_dir()?,
        };
        Ok(self.download_dir.insert(dir).path())
    }

    /// Parse the manifest of a downloaded module through a private copy.
    fn fetch_manifest(&self, module: &DownloadModule) -> Result<GoMod, ModError> {
        let dir = staging_dir()?;
        let copy = dir.path().join(GO_MOD);
        std::fs::copy(&module.go_mod, &copy).map_err(|e| ModError::io(&module.go_mod, e))?;
        tracing::debug!(module = %module.path, source = %module.go_mod, "copied go.mod of required module");

        ModFile::new(copy, self.modfile.toolchain().clone()).parse()
    }
}

fn staging_dir() -> Result<TempDir, ModError> {
    tempfile::Builder::new()
        .prefix("gomod.")
        .tempdir()
        .map_err(|e| ModError::io(std::env::temp_dir(), e))
}

fn resolved_version(module: &DownloadModule, requested: &str) -> String {
    if module.version.is_empty() {
        requested.to_string()
    } else {
        module.version.clone()
    }
}
