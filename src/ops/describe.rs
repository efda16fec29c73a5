//! Implementation of `mkrules version`.
//!
//! Derives build version metadata for the repository containing a
//! directory: the nearest tag, the commit and whether the tree is dirty.

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::util::git::{RepoInspector, TreeState};

/// Remote whose URL is reported.
pub const DEFAULT_REMOTE: &str = "origin";

/// Version metadata for a working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub git_version: String,
    pub git_commit: String,
    pub git_tree_state: TreeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_remote: Option<String>,
    pub docker_tag: String,
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "gitVersion:   {}", self.git_version)?;
        writeln!(f, "gitCommit:    {}", self.git_commit)?;
        writeln!(f, "gitTreeState: {}", self.git_tree_state)?;
        if let Some(remote) = &self.git_remote {
            writeln!(f, "gitRemote:    {}", remote)?;
        }
        write!(f, "dockerTag:    {}", self.docker_tag)
    }
}

/// Describe the repository containing `dir`.
pub fn describe(dir: &Path) -> Result<VersionInfo> {
    let repo = RepoInspector::discover(dir)?;
    let desc = repo.describe()?;
    let info = VersionInfo {
        git_version: desc.semantic_version(),
        git_commit: desc.hash.to_string(),
        git_tree_state: repo.tree_state()?,
        git_remote: repo.remote_url(DEFAULT_REMOTE)?,
        docker_tag: desc.docker_tag(),
    };
    tracing::debug!(version = %info.git_version, state = %info.git_tree_state, "described repository");
    Ok(info)
}
