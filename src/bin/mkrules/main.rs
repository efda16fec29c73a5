//! mkrules CLI - pin and reconcile Go module dependencies

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, ModCommands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("mkrules=debug")
    } else {
        EnvFilter::new("mkrules=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = cli.global();
    match cli.command {
        Commands::Mod(args) => match args.command {
            ModCommands::Require(args) => commands::require::execute(&global, args),
            ModCommands::Replace(args) => commands::replace::execute(&global, args),
            ModCommands::Tidy => commands::tidy::execute(&global),
            ModCommands::Update => commands::update::execute(&global),
            ModCommands::Format => commands::format::execute(&global),
        },
        Commands::Version(args) => commands::version::execute(&global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
