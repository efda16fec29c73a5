//! Dependency lister: the fully resolved module graph from `go list -m -json all`.

use std::path::{Path, PathBuf};

use crate::gomod::errors::ModError;
use crate::gomod::modfile::ModFile;
use crate::gomod::toolchain::GoToolchain;
use crate::gomod::types::ListModule;
use crate::gomod::version::LIST_NEEDS_TIDY;

/// Copy of a manifest's bytes, written back on [`Snapshot::restore`].
struct Snapshot {
    path: PathBuf,
    contents: Vec<u8>,
}

impl Snapshot {
    fn take(path: &Path) -> Result<Self, ModError> {
        let contents = std::fs::read(path).map_err(|e| ModError::io(path, e))?;
        Ok(Snapshot {
            path: path.to_path_buf(),
            contents,
        })
    }

    fn restore(self) -> Result<(), ModError> {
        std::fs::write(&self.path, &self.contents).map_err(|e| ModError::io(&self.path, e))
    }
}

impl<T: GoToolchain> ModFile<T> {
    /// List every module in the build graph except the main module.
    ///
    /// Newer toolchains rewrite `go.mod` while listing; the file is restored
    /// afterwards whether or not listing succeeded.
    pub fn list_resolved(&self) -> Result<Vec<ListModule>, ModError> {
        let snapshot = Snapshot::take(self.path())?;
        let listed = self.list_modules();

        match (listed, snapshot.restore()) {
            (Ok(modules), Ok(())) => Ok(modules),
            (Err(e), restored) => {
                if let Err(restore_err) = restored {
                    tracing::warn!(error = %restore_err, "failed to restore go.mod after listing");
                }
                Err(e)
            }
            (Ok(_), Err(e)) => Err(e),
        }
    }

    fn list_modules(&self) -> Result<Vec<ListModule>, ModError> {
        if self.go_version()? >= LIST_NEEDS_TIDY {
            self.tidy()?;
        }

        let out = self.run(self.dir(), &["list", "-m", "-json", "all"])?;
        decode_list(&out)
    }
}

/// Decode the concatenated JSON objects printed by `go list -m -json`.
pub fn decode_list(out: &[u8]) -> Result<Vec<ListModule>, ModError> {
    let mut modules = Vec::new();
    for module in serde_json::Deserializer::from_slice(out).into_iter::<ListModule>() {
        let module = module.map_err(|e| ModError::parse("`go list -m -json all` output", e))?;
        if module.main {
            continue;
        }
        if let Some(err) = &module.error {
            tracing::debug!(path = %module.path, error = %err.err, "module listed with error");
        }
        modules.push(module);
    }
    Ok(modules)
}
