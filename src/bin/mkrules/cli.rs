//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// mkrules - pin and reconcile Go module dependencies
#[derive(Parser)]
#[command(name = "mkrules")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long, global = true, env = "MKRULES_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub verbose: bool,
    pub workspace: Option<PathBuf>,
}

impl Cli {
    pub fn global(&self) -> GlobalArgs {
        GlobalArgs {
            verbose: self.verbose,
            workspace: self.workspace.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Go module dependency management
    Mod(ModArgs),

    /// Print the version of the repository being built
    Version(VersionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ModArgs {
    #[command(subcommand)]
    pub command: ModCommands,
}

#[derive(Subcommand)]
pub enum ModCommands {
    /// Pin a module and the modules it requires
    Require(RequireArgs),

    /// Redirect a module to another path or version
    Replace(ReplaceArgs),

    /// Reconcile go.mod to a minimal set of pins
    Tidy,

    /// Apply the pins from the configuration, then tidy
    Update,

    /// Rewrite go.mod in canonical form
    Format,
}

#[derive(Args)]
pub struct RequireArgs {
    /// <path> <version>
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Do not copy the module's own requirements
    #[arg(long)]
    pub skip_deps: bool,
}

#[derive(Args)]
pub struct ReplaceArgs {
    /// <path> [new-path] <version>
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct VersionArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
