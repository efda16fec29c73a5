//! Monorepos that publish in-tree staging directories as separate modules.
//!
//! Pinning such a monorepo also pins every staged module to the sibling
//! release tag, otherwise the toolchain resolves them to unrelated versions.

use crate::gomod::types::GoMod;
use crate::gomod::version::trim_version_marker;

/// One entry of the staging exception table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagingMonorepo {
    /// Module path of the monorepo root.
    pub path: &'static str,
    /// Replacement targets under this prefix are staged modules.
    pub staging_prefix: &'static str,
    /// Staged modules are tagged `<tag_prefix><version without v>`.
    pub tag_prefix: &'static str,
    /// Replaces under this namespace are never pruned as redundant.
    pub protected_prefix: &'static str,
}

pub const STAGING_MONOREPOS: &[StagingMonorepo] = &[StagingMonorepo {
    path: "k8s.io/kubernetes",
    staging_prefix: "./staging/src/k8s.io/",
    tag_prefix: "kubernetes-",
    protected_prefix: "k8s.io/",
}];

/// Look up the table entry whose root is exactly `path`.
pub fn find(path: &str) -> Option<&'static StagingMonorepo> {
    STAGING_MONOREPOS.iter().find(|m| m.path == path)
}

/// Whether `path` lives in a namespace whose pins are kept even when redundant.
pub fn is_protected(path: &str) -> bool {
    STAGING_MONOREPOS
        .iter()
        .any(|m| path.starts_with(m.protected_prefix))
}

impl StagingMonorepo {
    /// Old paths of the monorepo's own replaces that point into its staging tree.
    pub fn staged_modules<'a>(&self, gomod: &'a GoMod) -> Vec<&'a str> {
        gomod
            .replace
            .iter()
            .filter(|r| r.new.path.starts_with(self.staging_prefix))
            .map(|r| r.old.path.as_str())
            .collect()
    }

    /// Tag a staged module carries for the monorepo release `version`.
    pub fn staging_tag(&self, version: &str) -> String {
        format!("{}{}", self.tag_prefix, trim_version_marker(version))
    }
}
