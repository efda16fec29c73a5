//! Manifest accessor: structured reads and single-directive edits of a `go.mod`.
//!
//! The toolchain is the source of truth for the file format. Reads go
//! through `go mod edit -json` and every edit is one `go mod edit -fmt`
//! call, persisted immediately. Re-applying an edit leaves the file
//! unchanged.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::gomod::errors::ModError;
use crate::gomod::toolchain::{GoCommand, GoToolchain};
use crate::gomod::types::{DownloadModule, GoMod};

/// File name of a module manifest.
pub const GO_MOD: &str = "go.mod";

/// A single `go mod edit` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit<'a> {
    Require {
        path: &'a str,
        version: &'a str,
    },
    Replace {
        old: &'a str,
        new: &'a str,
        version: &'a str,
    },
    DropReplace {
        path: &'a str,
    },
}

impl Edit<'_> {
    fn flag(&self) -> String {
        match *self {
            Edit::Require { path, version } => format!("-require={}@{}", path, version),
            // Go rejects a version on a filesystem replacement.
            Edit::Replace { old, new, version } if version.is_empty() || is_local_path(new) => {
                format!("-replace={}={}", old, new)
            }
            Edit::Replace { old, new, version } => format!("-replace={}={}@{}", old, new, version),
            Edit::DropReplace { path } => format!("-dropreplace={}", path),
        }
    }
}

/// Whether a replacement target is a directory rather than a module path.
pub fn is_local_path(path: &str) -> bool {
    path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with('/')
        || path.starts_with(".\\")
        || path.starts_with("..\\")
        || path.starts_with('\\')
        || path.as_bytes().get(1..3) == Some(&b":\\"[..])
}

/// A `go.mod` on disk together with the toolchain that edits it.
#[derive(Debug, Clone)]
pub struct ModFile<T: GoToolchain = GoCommand> {
    path: PathBuf,
    dir: PathBuf,
    go: T,
    go_version: OnceCell<Version>,
}

impl<T: GoToolchain> ModFile<T> {
    /// Bind to the manifest at `path`; edits run in its directory.
    pub fn new(path: impl Into<PathBuf>, go: T) -> Self {
        let path = path.into();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        ModFile {
            path,
            dir,
            go,
            go_version: OnceCell::new(),
        }
    }

    /// Bind to `dir/go.mod`.
    pub fn in_dir(dir: impl AsRef<Path>, go: T) -> Self {
        Self::new(dir.as_ref().join(GO_MOD), go)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn toolchain(&self) -> &T {
        &self.go
    }

    pub(crate) fn run(&self, dir: &Path, args: &[&str]) -> Result<Vec<u8>, ModError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.go.run(dir, &args)
    }

    /// Detected toolchain version, queried once per manifest.
    pub fn go_version(&self) -> Result<Version, ModError> {
        if let Some(v) = self.go_version.get() {
            return Ok(v.clone());
        }
        let v = self.go.go_version(&self.dir)?;
        let _ = self.go_version.set(v.clone());
        Ok(v)
    }

    /// Parse the manifest into its structured form.
    pub fn parse(&self) -> Result<GoMod, ModError> {
        let out = self.run(&self.dir, &["mod", "edit", "-json"])?;
        serde_json::from_slice(&out).map_err(|e| ModError::parse(self.path.display().to_string(), e))
    }

    /// Set `require path version`.
    pub fn edit_require(&self, path: &str, version: &str) -> Result<(), ModError> {
        self.edit(Edit::Require { path, version })
    }

    /// Set `replace old => new version`.
    pub fn edit_replace(&self, old: &str, new: &str, version: &str) -> Result<(), ModError> {
        self.edit(Edit::Replace { old, new, version })
    }

    /// Remove the replace directive for `path`, if any.
    pub fn drop_replace(&self, path: &str) -> Result<(), ModError> {
        self.edit(Edit::DropReplace { path })
    }

    fn edit(&self, edit: Edit<'_>) -> Result<(), ModError> {
        let flag = edit.flag();
        tracing::debug!(edit = %flag, "go mod edit");
        self.run(&self.dir, &["mod", "edit", "-fmt", &flag])?;
        Ok(())
    }

    /// Run `go mod tidy`.
    pub fn tidy(&self) -> Result<(), ModError> {
        self.run(&self.dir, &["mod", "tidy"])?;
        Ok(())
    }

    /// Resolve `path@version` with `go mod download`, running in `staging_dir`
    /// so the bound manifest is never touched.
    pub fn download(
        &self,
        staging_dir: &Path,
        path: &str,
        version: &str,
    ) -> Result<DownloadModule, ModError> {
        let query = format!("{}@{}", path, version);
        let out = self.run(staging_dir, &["mod", "download", "-json", &query])?;
        let module: DownloadModule = serde_json::from_slice(&out)
            .map_err(|e| ModError::parse(format!("download result for {}", query), e))?;

        if !module.error.is_empty() {
            return Err(ModError::Download {
                path: path.to_string(),
                version: version.to_string(),
                reason: module.error,
            });
        }
        if module.go_mod.is_empty() {
            return Err(ModError::Download {
                path: path.to_string(),
                version: version.to_string(),
                reason: "module does not have a go.mod file".to_string(),
            });
        }
        Ok(module)
    }

    /// Rewrite the file in canonical form.
    pub fn format(&self) -> Result<(), ModError> {
        let gomod = self.parse()?;
        std::fs::write(&self.path, render(&gomod)).map_err(|e| ModError::io(&self.path, e))
    }
}

/// Canonical text of a manifest: module and go lines, then the `require`,
/// `exclude` and `replace` blocks, each sorted by path and tab-indented.
pub fn render(gomod: &GoMod) -> String {
    let mut sections = vec![format!("module {}\n", gomod.module.path)];

    if !gomod.go.is_empty() {
        sections.push(format!("go {}\n", gomod.go));
    }

    if !gomod.require.is_empty() {
        let mut require: Vec<_> = gomod.require.iter().collect();
        require.sort_by(|a, b| a.path.cmp(&b.path));
        let lines = require.iter().map(|r| {
            let mut line = format!("{} {}", r.path, r.version);
            if r.indirect {
                line.push_str(" // indirect");
            }
            line
        });
        sections.push(block("require", lines));
    }

    if !gomod.exclude.is_empty() {
        let mut exclude: Vec<_> = gomod.exclude.iter().collect();
        exclude.sort_by(|a, b| (&a.path, &a.version).cmp(&(&b.path, &b.version)));
        let lines = exclude.iter().map(|m| format!("{} {}", m.path, m.version));
        sections.push(block("exclude", lines));
    }

    if !gomod.replace.is_empty() {
        let mut replace: Vec<_> = gomod.replace.iter().collect();
        replace.sort_by(|a, b| a.old.path.cmp(&b.old.path));
        let lines = replace.iter().map(|r| {
            format!(
                "{} => {}",
                join_module(&r.old.path, &r.old.version),
                join_module(&r.new.path, &r.new.version)
            )
        });
        sections.push(block("replace", lines));
    }

    sections.join("\n")
}

fn block(verb: &str, lines: impl Iterator<Item = String>) -> String {
    let mut out = format!("{} (\n", verb);
    for line in lines {
        out.push('\t');
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(")\n");
    out
}

fn join_module(path: &str, version: &str) -> String {
    if version.is_empty() {
        path.to_string()
    } else {
        format!("{} {}", path, version)
    }
}
