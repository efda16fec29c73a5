//! Test utilities for mkrules unit tests.
//!
//! [`FakeGo`] stands in for the `go` binary. It keeps a registry of
//! published modules and simulates the handful of subcommands the pinning
//! engine drives against a real `go.mod` on disk, recording every call.
//!
//! # Example
//!
//! ```rust,ignore
//! use mkrules::test_support::{write_gomod, FakeGo};
//!
//! #[test]
//! fn test_example() {
//!     let go = FakeGo::new();
//!     go.publish("github.com/a/foo", "v1.0.0", None);
//!     go.imports(&["github.com/a/foo"]);
//!
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     write_gomod(tmp.path(), &gomod);
//!     let modfile = ModFile::in_dir(tmp.path(), go.clone());
//!     // ...
//!     assert_eq!(go.calls(), vec!["mod edit -json"]);
//! }
//! ```

pub mod fixtures;

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tempfile::TempDir;

use crate::gomod::modfile::{render, GO_MOD};
use crate::gomod::toolchain::GoToolchain;
use crate::gomod::types::{DownloadModule, GoMod, ListModule, Module, Replace, Require};
use crate::gomod::ModError;

pub use fixtures::*;

/// A module version known to the fake module proxy.
#[derive(Debug, Clone)]
struct Published {
    path: String,
    version: String,
    go_mod: Option<GoMod>,
}

#[derive(Debug)]
struct FakeState {
    go_version: String,
    /// `path@version` -> module
    registry: BTreeMap<String, Published>,
    /// `path@query` -> version
    aliases: BTreeMap<String, String>,
    imports: Option<BTreeSet<String>>,
    unimported: BTreeSet<String>,
    fail_on: Vec<String>,
    calls: Vec<String>,
    downloads: Vec<String>,
    cache: Option<TempDir>,
}

/// In-process stand-in for the `go` toolchain.
///
/// Clones share state, so a test can keep one handle and give another to
/// the code under test.
#[derive(Debug, Clone)]
pub struct FakeGo {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeGo {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGo {
    pub fn new() -> Self {
        FakeGo {
            state: Arc::new(Mutex::new(FakeState {
                go_version: "go1.21.0".to_string(),
                registry: BTreeMap::new(),
                aliases: BTreeMap::new(),
                imports: None,
                unimported: BTreeSet::new(),
                fail_on: Vec::new(),
                calls: Vec::new(),
                downloads: Vec::new(),
                cache: None,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Report `version` from `go version`.
    pub fn with_go_version(self, version: &str) -> Self {
        self.state().go_version = version.to_string();
        self
    }

    /// Make `path@version` downloadable. `None` publishes a module without a `go.mod`.
    pub fn publish(&self, path: &str, version: &str, go_mod: Option<GoMod>) {
        self.state().registry.insert(
            format!("{}@{}", path, version),
            Published {
                path: path.to_string(),
                version: version.to_string(),
                go_mod,
            },
        );
    }

    /// Resolve the query `path@query` (a branch, a tag) to `version`.
    pub fn alias(&self, path: &str, query: &str, version: &str) {
        self.state()
            .aliases
            .insert(format!("{}@{}", path, query), version.to_string());
    }

    /// Modules whose packages the main module imports.
    ///
    /// Without this every direct require counts as imported unless it was
    /// marked with [`FakeGo::unimported`].
    pub fn imports(&self, paths: &[&str]) {
        let mut state = self.state();
        let imports = state.imports.get_or_insert_with(BTreeSet::new);
        imports.extend(paths.iter().map(|p| p.to_string()));
    }

    pub fn unimported(&self, path: &str) {
        self.state().unimported.insert(path.to_string());
    }

    /// Fail every command whose arguments contain `pattern`.
    pub fn fail_on(&self, pattern: &str) {
        self.state().fail_on.push(pattern.to_string());
    }

    /// Arguments of every call, joined by spaces.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// `path@query` of every `go mod download`.
    pub fn downloads(&self) -> Vec<String> {
        self.state().downloads.clone()
    }
}

impl GoToolchain for FakeGo {
    fn run(&self, dir: &Path, args: &[String]) -> Result<Vec<u8>, ModError> {
        let command = args.join(" ");
        let mut state = self.state();
        state.calls.push(command.clone());

        if state.fail_on.iter().any(|p| command.contains(p.as_str())) {
            return Err(failure(&command, "simulated failure"));
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["version"] => {
                Ok(format!("go version {} linux/amd64\n", state.go_version).into_bytes())
            }
            ["mod", "edit", "-json"] => {
                let gomod = read_manifest(dir, &command)?;
                Ok(serde_json::to_vec_pretty(&gomod).unwrap())
            }
            ["mod", "edit", "-fmt", flag] => {
                let mut gomod = read_manifest(dir, &command)?;
                apply_edit(&mut gomod, flag).map_err(|msg| failure(&command, &msg))?;
                write_gomod(dir, &gomod);
                Ok(Vec::new())
            }
            ["mod", "tidy"] => {
                let mut gomod = read_manifest(dir, &command)?;
                state.tidy(&mut gomod);
                write_gomod(dir, &gomod);
                Ok(Vec::new())
            }
            ["list", "-m", "-json", "all"] => {
                let gomod = read_manifest(dir, &command)?;
                Ok(state.list(dir, &gomod))
            }
            ["mod", "download", "-json", query] => state.download(&command, query),
            _ => Err(failure(&command, "unsupported command")),
        }
    }
}

impl FakeState {
    /// Minimal version selection over the registry, starting at `roots`.
    fn resolve<'a>(
        &self,
        gomod: &GoMod,
        roots: impl Iterator<Item = &'a str>,
    ) -> BTreeMap<String, String> {
        let mut queue: VecDeque<(String, String)> = roots
            .filter_map(|p| gomod.find_require(p))
            .map(|r| (r.path.clone(), r.version.clone()))
            .collect();
        let mut selected: BTreeMap<String, String> = BTreeMap::new();

        while let Some((path, mut version)) = queue.pop_front() {
            if let Some(r) = gomod.find_require(&path) {
                if newer(&r.version, &version) {
                    version = r.version.clone();
                }
            }
            if let Some(current) = selected.get(&path) {
                if !newer(&version, current) {
                    continue;
                }
            }
            selected.insert(path.clone(), version.clone());

            let (source, source_version) = match gomod.find_replace(&path) {
                Some(r) => (r.new.path.clone(), r.new.version.clone()),
                None => (path, version),
            };
            let deps = self
                .registry
                .get(&format!("{}@{}", source, source_version))
                .and_then(|m| m.go_mod.as_ref());
            if let Some(deps) = deps {
                for r in &deps.require {
                    queue.push_back((r.path.clone(), r.version.clone()));
                }
            }
        }
        selected
    }

    fn tidy(&self, gomod: &mut GoMod) {
        let imports: BTreeSet<String> = match &self.imports {
            Some(imports) => imports.clone(),
            None => gomod
                .require
                .iter()
                .filter(|r| !r.indirect && !self.unimported.contains(&r.path))
                .map(|r| r.path.clone())
                .collect(),
        };
        let selected = self.resolve(gomod, imports.iter().map(String::as_str));
        gomod.require = selected
            .into_iter()
            .map(|(path, version)| Require {
                indirect: !imports.contains(&path),
                path,
                version,
            })
            .collect();
    }

    fn list(&self, dir: &Path, gomod: &GoMod) -> Vec<u8> {
        let selected = self.resolve(gomod, gomod.require.iter().map(|r| r.path.as_str()));

        let mut rows = vec![ListModule {
            path: gomod.module.path.clone(),
            main: true,
            dir: dir.display().to_string(),
            go_mod: dir.join(GO_MOD).display().to_string(),
            go_version: gomod.go.clone(),
            ..Default::default()
        }];
        for (path, version) in selected {
            let replace = gomod.find_replace(&path).map(|r| {
                Box::new(ListModule {
                    path: r.new.path.clone(),
                    version: r.new.version.clone(),
                    ..Default::default()
                })
            });
            rows.push(ListModule {
                indirect: gomod.find_require(&path).map_or(true, |r| r.indirect),
                path,
                version,
                replace,
                ..Default::default()
            });
        }

        let mut out = Vec::new();
        for row in rows {
            out.extend(serde_json::to_vec_pretty(&row).unwrap());
            out.push(b'\n');
        }
        out
    }

    fn download(&mut self, command: &str, query: &str) -> Result<Vec<u8>, ModError> {
        self.downloads.push(query.to_string());
        let (path, requested) = query
            .split_once('@')
            .ok_or_else(|| failure(command, "malformed module query"))?;
        let version = self
            .aliases
            .get(query)
            .cloned()
            .unwrap_or_else(|| requested.to_string());

        let published = self
            .registry
            .get(&format!("{}@{}", path, version))
            .cloned()
            .ok_or_else(|| failure(command, &format!("go: module {}: not found", query)))?;

        let go_mod = match &published.go_mod {
            Some(manifest) => {
                let cache = self.cache.get_or_insert_with(|| TempDir::new().unwrap());
                let file = cache
                    .path()
                    .join(format!("{}@{}.mod", published.path.replace('/', "!"), published.version));
                std::fs::write(&file, render(manifest)).unwrap();
                file.display().to_string()
            }
            None => String::new(),
        };

        let module = DownloadModule {
            path: published.path,
            version: published.version,
            go_mod,
            ..Default::default()
        };
        Ok(serde_json::to_vec_pretty(&module).unwrap())
    }
}

fn failure(command: &str, output: &str) -> ModError {
    ModError::Toolchain {
        command: format!("go {}", command),
        reason: "exit status: 1".to_string(),
        output: output.to_string(),
    }
}

fn read_manifest(dir: &Path, command: &str) -> Result<GoMod, ModError> {
    std::fs::read_to_string(dir.join(GO_MOD))
        .map(|text| parse_gomod(&text))
        .map_err(|_| failure(command, "go: go.mod file not found in current directory"))
}

/// Apply one `go mod edit` flag.
fn apply_edit(gomod: &mut GoMod, flag: &str) -> Result<(), String> {
    if let Some(spec) = flag.strip_prefix("-require=") {
        let (path, version) = spec
            .split_once('@')
            .ok_or_else(|| format!("go: -require={}: need path@version", spec))?;
        match gomod.require.iter_mut().find(|r| r.path == path) {
            Some(r) => r.version = version.to_string(),
            None => gomod.require.push(Require::new(path, version)),
        }
    } else if let Some(spec) = flag.strip_prefix("-replace=") {
        let (old, new) = spec
            .split_once('=')
            .ok_or_else(|| format!("go: -replace={}: need old[@v]=new[@w]", spec))?;
        let replace = Replace {
            old: split_module(old),
            new: split_module(new),
        };
        match gomod.replace.iter_mut().find(|r| r.old == replace.old) {
            Some(r) => *r = replace,
            None => gomod.replace.push(replace),
        }
    } else if let Some(path) = flag.strip_prefix("-dropreplace=") {
        gomod.replace.retain(|r| r.old.path != path);
    } else {
        return Err(format!("go: unknown flag {}", flag));
    }
    Ok(())
}

fn split_module(spec: &str) -> Module {
    match spec.split_once('@') {
        Some((path, version)) => Module::new(path, version),
        None => Module::new(spec, ""),
    }
}

/// Whether `a` sorts after `b` as a module version.
fn newer(a: &str, b: &str) -> bool {
    let parse = |v: &str| semver::Version::parse(v.trim_start_matches('v')).ok();
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a > b,
        _ => a > b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer() {
        assert!(newer("v1.10.0", "v1.9.0"));
        assert!(!newer("v1.0.0", "v1.0.0"));
        // pseudo-versions are pre-releases of their base version
        assert!(!newer("v0.0.0-20200101000000-abcdef123456", "v0.0.0"));
        assert!(newer(
            "v0.0.0-20210101000000-0123456789ab",
            "v0.0.0-20200101000000-abcdef123456"
        ));
    }

    #[test]
    fn test_apply_edit() {
        let mut gomod = GoMod::default();
        apply_edit(&mut gomod, "-require=foo@v1.0.0").unwrap();
        apply_edit(&mut gomod, "-replace=foo=../foo").unwrap();
        apply_edit(&mut gomod, "-replace=bar=baz@v1.0.0").unwrap();
        apply_edit(&mut gomod, "-dropreplace=bar").unwrap();

        assert_eq!(gomod.require, vec![Require::new("foo", "v1.0.0")]);
        assert_eq!(gomod.replace, vec![Replace::new("foo", "../foo", "")]);
        assert!(apply_edit(&mut gomod, "-exclude=foo@v1.0.0").is_err());
    }

    #[test]
    fn test_fake_tidy_adds_transitive_requirements() {
        let go = FakeGo::new();
        go.publish(
            "foo",
            "v1.0.0",
            Some(GoMod {
                module: Module::new("foo", ""),
                require: vec![Require::new("bar", "v1.1.0")],
                ..Default::default()
            }),
        );
        go.unimported("unused");

        let tmp = TempDir::new().unwrap();
        write_gomod(
            tmp.path(),
            &GoMod {
                module: Module::new("example.com/app", ""),
                go: "1.16".to_string(),
                require: vec![Require::new("foo", "v1.0.0"), Require::new("unused", "v1.0.0")],
                ..Default::default()
            },
        );
        go.run(tmp.path(), &["mod".to_string(), "tidy".to_string()])
            .unwrap();

        let gomod = read_gomod(tmp.path());
        assert_eq!(
            gomod.require,
            vec![Require::new("bar", "v1.1.0").indirect(), Require::new("foo", "v1.0.0")]
        );
    }
}
