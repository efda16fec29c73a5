//! Data model shared by the manifest accessor, the lister and the pinning engine.
//!
//! Field names follow the JSON emitted by `go mod edit -json`,
//! `go list -m -json` and `go mod download -json`.

use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// A `path version` pair as it appears in `exclude` and on both sides of `replace`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Module {
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

impl Module {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Module {
            path: path.into(),
            version: version.into(),
        }
    }
}

/// A `require` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Require {
    pub path: String,
    pub version: String,
    #[serde(skip_serializing_if = "is_false")]
    pub indirect: bool,
}

impl Require {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Require {
            path: path.into(),
            version: version.into(),
            indirect: false,
        }
    }

    /// Mark this requirement as `// indirect`.
    pub fn indirect(mut self) -> Self {
        self.indirect = true;
        self
    }
}

/// A `replace` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Replace {
    pub old: Module,
    pub new: Module,
}

impl Replace {
    pub fn new(
        old_path: impl Into<String>,
        new_path: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        Replace {
            old: Module::new(old_path, ""),
            new: Module::new(new_path, new_version),
        }
    }

    /// Whether the replacement points at a different module path.
    pub fn renames(&self) -> bool {
        self.old.path != self.new.path
    }
}

/// The structured form of a `go.mod` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GoMod {
    pub module: Module,
    pub go: String,
    #[serde(deserialize_with = "nullable_vec")]
    pub require: Vec<Require>,
    #[serde(deserialize_with = "nullable_vec")]
    pub exclude: Vec<Module>,
    #[serde(deserialize_with = "nullable_vec")]
    pub replace: Vec<Replace>,
}

impl GoMod {
    /// Find the require directive for `path`.
    pub fn find_require(&self, path: &str) -> Option<&Require> {
        self.require.iter().find(|r| r.path == path)
    }

    /// Find the replace directive whose old path is `path`.
    pub fn find_replace(&self, path: &str) -> Option<&Replace> {
        self.replace.iter().find(|r| r.old.path == path)
    }
}

/// Go encodes empty slices as `null`.
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error reported by `go list` for a single module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModuleError {
    pub err: String,
}

/// One row of `go list -m -json all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListModule {
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<Box<ListModule>>,
    #[serde(skip_serializing_if = "is_false")]
    pub main: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub indirect: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dir: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub go_mod: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub go_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ModuleError>,
}

impl ListModule {
    /// Whether this row is pinned by a replace to exactly the version the
    /// resolver would have selected anyway.
    pub fn is_naturally_selected(&self) -> bool {
        match &self.replace {
            Some(r) => r.path == self.path && r.version == self.version,
            None => false,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of `go mod download -json path@version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DownloadModule {
    pub path: String,
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub info: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub go_mod: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dir: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sum: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub go_mod_sum: String,
}

/// Which user-facing operation a [`PinRequest`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    /// Pin a module and capture its own requirements.
    Require,
    /// Redirect a module path, optionally to a local directory.
    Replace,
}

/// A single pin operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRequest {
    pub kind: PinKind,
    pub old_path: String,
    pub new_path: String,
    pub version: String,
    pub skip_deps: bool,
}

impl PinRequest {
    /// Pin `path` to itself at `version`.
    pub fn require(path: impl Into<String>, version: impl Into<String>, skip_deps: bool) -> Self {
        let path = path.into();
        PinRequest {
            kind: PinKind::Require,
            new_path: path.clone(),
            old_path: path,
            version: version.into(),
            skip_deps,
        }
    }

    /// Redirect `old_path` to `new_path` at `version`.
    pub fn replace(
        old_path: impl Into<String>,
        new_path: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        PinRequest {
            kind: PinKind::Replace,
            old_path: old_path.into(),
            new_path: new_path.into(),
            version: version.into(),
            skip_deps: true,
        }
    }
}
