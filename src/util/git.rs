//! Repository inspection for deriving artifact versions.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use git2::{Oid, Repository, Sort, StatusOptions};
use serde::Serialize;

/// Length of the abbreviated commit hash in version strings.
pub const SHORT_HASH_LEN: usize = 7;

/// Whether the working tree matches HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeState {
    Clean,
    Dirty,
}

impl fmt::Display for TreeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeState::Clean => f.write_str("clean"),
            TreeState::Dirty => f.write_str("dirty"),
        }
    }
}

/// Nearest tag reachable from a commit, like `git describe --tags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Describe {
    /// Short name of the tag, if any commit in the history carries one.
    pub tag: Option<String>,
    /// Commits between the described commit and the tagged one.
    pub count: usize,
    pub hash: Oid,
}

impl Describe {
    /// A semver.org compatible version such as `v1.1.0-alpha.0.6+84c76d1`.
    pub fn semantic_version(&self) -> String {
        self.format('+')
    }

    /// Like [`Describe::semantic_version`] with `-` for `+`, which image tags
    /// cannot contain.
    pub fn docker_tag(&self) -> String {
        self.format('-')
    }

    fn format(&self, build_sep: char) -> String {
        let hash = self.short_hash();
        match &self.tag {
            None if self.count > 0 => format!("v0.0.0-{}{}{}", self.count, build_sep, hash),
            None => format!("v0.0.0-{}", hash),
            Some(tag) if self.count == 0 => tag.clone(),
            // already a pre-release, extend it
            Some(tag) if tag.contains('-') => {
                format!("{}.{}{}{}", tag, self.count, build_sep, hash)
            }
            Some(tag) => format!("{}-{}{}{}", tag, self.count, build_sep, hash),
        }
    }

    pub fn short_hash(&self) -> String {
        let mut hash = self.hash.to_string();
        hash.truncate(SHORT_HASH_LEN);
        hash
    }
}

/// Read-only view of a git repository.
pub struct RepoInspector {
    repo: Repository,
}

impl RepoInspector {
    /// Open the repository containing `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let repo = Repository::discover(dir)
            .with_context(|| format!("no git repository found at {}", dir.display()))?;
        Ok(RepoInspector { repo })
    }

    /// Open the repository rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let repo = Repository::open(dir)
            .with_context(|| format!("failed to open git repository: {}", dir.display()))?;
        Ok(RepoInspector { repo })
    }

    pub fn head_hash(&self) -> Result<Oid> {
        let head = self.repo.head().context("failed to resolve HEAD")?;
        Ok(head.peel_to_commit()?.id())
    }

    /// Dirty if anything is modified, staged or untracked. Ignored files do
    /// not count.
    pub fn tree_state(&self) -> Result<TreeState> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);
        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .context("failed to read worktree status")?;

        if statuses.is_empty() {
            Ok(TreeState::Clean)
        } else {
            Ok(TreeState::Dirty)
        }
    }

    /// Describe HEAD against the tags of the repository.
    ///
    /// History is walked newest first by committer time; the walk stops at
    /// the first commit carrying a tag.
    pub fn describe(&self) -> Result<Describe> {
        let hash = self.head_hash()?;
        let tags = self.tags_by_commit()?;
        if tags.is_empty() {
            return Ok(Describe {
                tag: None,
                count: 0,
                hash,
            });
        }

        let mut walk = self.repo.revwalk()?;
        walk.push(hash)?;
        walk.set_sorting(Sort::TIME)?;

        let mut count = 0;
        for oid in walk {
            let oid = oid?;
            if let Some(tag) = tags.get(&oid) {
                return Ok(Describe {
                    tag: Some(tag.clone()),
                    count,
                    hash,
                });
            }
            count += 1;
        }

        Ok(Describe {
            tag: None,
            count,
            hash,
        })
    }

    /// Tag names keyed by the commit they point to. Annotated tags are
    /// peeled; with several tags on one commit the greatest name wins.
    fn tags_by_commit(&self) -> Result<HashMap<Oid, String>> {
        let mut tags = HashMap::new();
        let names = self.repo.tag_names(None)?;
        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            let Ok(commit) = reference.peel_to_commit() else {
                tracing::debug!(tag = name, "tag does not point to a commit");
                continue;
            };
            let entry = tags.entry(commit.id()).or_insert_with(|| name.to_string());
            if name > entry.as_str() {
                *entry = name.to_string();
            }
        }
        Ok(tags)
    }

    /// URL of the remote `name`, if it exists and has one.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(str::to_string)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read remote `{}`", name)),
        }
    }
}
