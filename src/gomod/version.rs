//! Module version validity and Go toolchain version checks.

use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::gomod::errors::ModError;

/// Version written for replacements that point at an unversioned target.
pub const ZERO_VERSION: &str = "v0.0.0";

/// The zero pseudo-version Go writes for unresolved requirements.
pub const ZERO_PSEUDO_VERSION: &str = "v0.0.0-00010101000000-000000000000";

/// Oldest Go toolchain the pinning engine knows how to drive.
pub const MINIMUM_GO_VERSION: Version = Version::new(1, 13, 0);

/// Since this release `go list -m all` fails unless `go.mod` is tidy.
pub const LIST_NEEDS_TIDY: Version = Version::new(1, 16, 0);

/// Returns false for the sentinel strings meaning "no version".
pub fn is_valid_version(version: &str) -> bool {
    !matches!(version, "" | ZERO_VERSION | ZERO_PSEUDO_VERSION | "v0")
}

static GO_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"go(\d+)\.(\d+)(?:\.(\d+))?").expect("valid regex"));

/// Parse the output of `go version` (`go version go1.21.5 linux/amd64`),
/// or a bare `go1.22` / `go1.22rc1`.
pub fn parse_go_version(raw: &str) -> Option<Version> {
    let caps = GO_VERSION_RE.captures(raw.trim())?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps
        .get(3)
        .map_or(Some(0), |m| m.as_str().parse().ok())?;
    Some(Version::new(major, minor, patch))
}

/// Fail if the detected toolchain is older than [`MINIMUM_GO_VERSION`].
pub fn verify_go_version(detected: &Version) -> Result<(), ModError> {
    if *detected < MINIMUM_GO_VERSION {
        return Err(ModError::UnsupportedGoVersion {
            detected: detected.to_string(),
            minimum: MINIMUM_GO_VERSION.to_string(),
        });
    }
    Ok(())
}

/// Strip the leading `v` markers from a module version (`v1.18.0` -> `1.18.0`).
pub fn trim_version_marker(version: &str) -> &str {
    version.trim_start_matches('v')
}
