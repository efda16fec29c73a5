//! Invocation of the external `go` toolchain.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::gomod::errors::ModError;
use crate::gomod::version::parse_go_version;
use crate::util::process::{combined_output, find_go, ProcessBuilder};

/// Something that can run `go <args>` in a directory.
///
/// Implementations return the process output on success and a
/// [`ModError::Toolchain`] carrying the command line and combined output
/// otherwise. Clones share the same underlying toolchain.
pub trait GoToolchain: Clone {
    fn run(&self, dir: &Path, args: &[String]) -> Result<Vec<u8>, ModError>;

    /// Version of the toolchain, from `go version`. `go env GOVERSION`
    /// only exists since go1.16.
    fn go_version(&self, dir: &Path) -> Result<Version, ModError> {
        let out = self.run(dir, &["version".to_string()])?;
        let raw = String::from_utf8_lossy(&out);
        parse_go_version(&raw).ok_or_else(|| ModError::Toolchain {
            command: "go version".to_string(),
            reason: "unrecognized go version".to_string(),
            output: raw.trim().to_string(),
        })
    }
}

/// The real `go` binary.
#[derive(Debug, Clone)]
pub struct GoCommand {
    program: PathBuf,
    env: BTreeMap<String, String>,
}

impl GoCommand {
    /// Use `go` from `$GO` or `PATH`.
    pub fn detect() -> Result<Self, ModError> {
        let program = find_go().ok_or_else(|| ModError::Toolchain {
            command: "go".to_string(),
            reason: "executable not found in PATH".to_string(),
            output: String::new(),
        })?;
        Ok(Self::new(program))
    }

    pub fn new(program: impl Into<PathBuf>) -> Self {
        GoCommand {
            program: program.into(),
            env: BTreeMap::new(),
        }
    }

    /// Extra environment for every invocation, e.g. `GOPROXY`.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn process(&self, dir: &Path, args: &[String]) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .args(args)
            .envs(&self.env)
            .env("GO111MODULE", "on")
            .cwd(dir)
    }
}

impl GoToolchain for GoCommand {
    fn run(&self, dir: &Path, args: &[String]) -> Result<Vec<u8>, ModError> {
        let process = self.process(dir, args);
        let command = process.display_command();
        tracing::trace!(%command, dir = %dir.display(), "exec");

        let output = process.exec().map_err(|e| ModError::Toolchain {
            command: command.clone(),
            reason: format!("{:#}", e),
            output: String::new(),
        })?;

        if !output.status.success() {
            return Err(ModError::Toolchain {
                command,
                reason: output.status.to_string(),
                output: combined_output(&output),
            });
        }
        Ok(output.stdout)
    }
}
