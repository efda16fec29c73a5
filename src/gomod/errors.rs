//! Error types for module pinning and reconciliation.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Phases of the reconciliation driver, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TidyPhase {
    EnsureRequireAndReplace,
    Tidy,
    EnsureMissingRequireAndReplace,
    Format,
    PruneReplace,
    FinalTidy,
}

impl fmt::Display for TidyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TidyPhase::EnsureRequireAndReplace => "ensure require and replace",
            TidyPhase::Tidy => "go mod tidy",
            TidyPhase::EnsureMissingRequireAndReplace => "ensure missing require and replace",
            TidyPhase::Format => "format go.mod",
            TidyPhase::PruneReplace => "prune replace",
            TidyPhase::FinalTidy => "final go mod tidy",
        };
        f.write_str(name)
    }
}

/// Error raised while editing or reconciling a `go.mod`.
#[derive(Debug, Error, Diagnostic)]
pub enum ModError {
    #[error("failed to run `{command}`: {reason}\n{output}")]
    #[diagnostic(
        code(mkrules::toolchain),
        help("Check that `go` is installed and the module proxy is reachable")
    )]
    Toolchain {
        command: String,
        reason: String,
        output: String,
    },

    #[error("module `{path}` version `{version}` could not be downloaded: {reason}")]
    #[diagnostic(
        code(mkrules::download),
        help("Check that the module path and version exist and are accessible")
    )]
    Download {
        path: String,
        version: String,
        reason: String,
    },

    #[error("failed to decode {what}")]
    #[diagnostic(code(mkrules::manifest_parse))]
    ManifestParse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(mkrules::usage))]
    Usage(String),

    #[error("i/o error on {}", path.display())]
    #[diagnostic(code(mkrules::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("detected go version {detected}, this project requires {minimum} or later")]
    #[diagnostic(code(mkrules::go_version), help("Install go {minimum} or later"))]
    UnsupportedGoVersion { detected: String, minimum: String },

    #[error("failed to {phase}")]
    #[diagnostic(code(mkrules::tidy))]
    Phase {
        phase: TidyPhase,
        #[source]
        source: Box<ModError>,
    },
}

impl ModError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(what: impl Into<String>, source: serde_json::Error) -> Self {
        ModError::ManifestParse {
            what: what.into(),
            source,
        }
    }

    /// The phase a reconciliation failure happened in, if any.
    pub fn phase(&self) -> Option<TidyPhase> {
        match self {
            ModError::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Attach a [`TidyPhase`] to a failure.
pub(crate) trait PhaseContext<T> {
    fn in_phase(self, phase: TidyPhase) -> Result<T, ModError>;
}

impl<T> PhaseContext<T> for Result<T, ModError> {
    fn in_phase(self, phase: TidyPhase) -> Result<T, ModError> {
        self.map_err(|e| ModError::Phase {
            phase,
            source: Box::new(e),
        })
    }
}
