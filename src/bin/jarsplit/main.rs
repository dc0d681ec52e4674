//! Jarsplit CLI - merge and split JVM classpaths for usage analysis

use anyhow::Result;
use clap::Parser;
use jarsplit::ArchiveError;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        let archive_error = e.chain().find_map(|cause| cause.downcast_ref::<ArchiveError>());
        if let Some(err) = archive_error {
            for suggestion in err.to_diagnostic().suggestions {
                eprintln!("help: {}", suggestion);
            }
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("jarsplit=debug")
    } else {
        EnvFilter::new("jarsplit=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Target(args) => commands::target::execute(args),
        Commands::Probe(args) => commands::probe::execute(args),
        Commands::Run(args) => commands::run::execute(args),
    }
}
